pub mod assess;
pub mod config_cmd;
pub mod prompt;
pub mod status;

use estimait_config::AppConfig;
use std::path::{Path, PathBuf};

/// Load config from `path` if given, else the default location.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let path = config_file(path);
    AppConfig::load_with_env(&path).map_err(|e| format!("Failed to load config: {e}").into())
}

/// The config file in effect.
pub fn config_file(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf)
        .unwrap_or_else(AppConfig::config_path)
}
