pub mod app_state;
pub mod config;
pub mod lock;

pub use app_state::{default_data_dir, AppState, LauncherPaths};
pub use config::LauncherConfig;
