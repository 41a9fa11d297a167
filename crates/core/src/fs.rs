//! Filesystem checks
//!
//! The archive never creates or mutates files; these helpers only verify
//! that a configured dataset path points at something sensible before the
//! server commits to opening it.

use std::path::Path;

/// Check if a path exists
pub fn path_exists(path: &str) -> bool {
    Path::new(path).exists()
}

/// Check if a path is a regular file
pub fn is_file(path: &str) -> bool {
    Path::new(path).is_file()
}
