//! Climate Archive Core Library
//!
//! Shared utilities for the archive server:
//! - Configuration loading (XDG-compliant)
//! - File system checks
//! - Common constants

mod config;
pub mod fs;

pub use config::{find_config_file, load_config, ConfigSource};
pub use fs::{is_file, path_exists};

/// Application name used for XDG paths
pub const APP_NAME: &str = "climate-archive";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 9600;

/// Default location of the measurement dataset
pub const DEFAULT_DATABASE_PATH: &str = "./data/climate.sqlite";
