//! On-disk layout of the config directory.
//!
//! ```text
//! <config_dir>/
//!   main.json
//!   data/
//!     <context_id>/config.json
//!     <context_id>/memory.json
//! ```

pub mod context_repo;

use std::path::{Path, PathBuf};

/// Environment variable naming the config directory. Beats the CLI flag.
pub const CONFIG_DIR_ENV: &str = "CONFIG_DIR";

pub const MAIN_CONFIG_FILE: &str = "main.json";
pub const DATA_DIR: &str = "data";

/// Pick the config directory: environment first, then the CLI flag.
///
/// Empty values count as absent. Returns `None` when neither is set.
pub fn resolve_config_dir(env_value: Option<String>, flag: Option<PathBuf>) -> Option<PathBuf> {
    env_value
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| flag.filter(|p| !p.as_os_str().is_empty()))
}

/// [`resolve_config_dir`] reading [`CONFIG_DIR_ENV`] from the process environment.
pub fn config_dir_from_env(flag: Option<PathBuf>) -> Option<PathBuf> {
    resolve_config_dir(std::env::var(CONFIG_DIR_ENV).ok(), flag)
}

pub fn main_config_path(config_dir: &Path) -> PathBuf {
    config_dir.join(MAIN_CONFIG_FILE)
}

pub fn data_dir(config_dir: &Path) -> PathBuf {
    config_dir.join(DATA_DIR)
}

/// Create the config and data directories if they do not exist.
pub async fn ensure_layout(config_dir: &Path) -> Result<(), std::io::Error> {
    tokio::fs::create_dir_all(data_dir(config_dir)).await
}
