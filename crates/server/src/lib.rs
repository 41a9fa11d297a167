pub mod analysis;
pub mod db;
pub mod routes;
mod startup;
mod templates;
mod utils;

pub use startup::{app, build_app_state, AnnualSummary, AppState};
pub use utils::{get_config_info, get_log_level, setup_logger, Cli};
