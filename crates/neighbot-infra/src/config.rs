//! Main configuration file loader.
//!
//! Reads `main.json` from the config directory. A missing file yields the
//! defaults (and is reported as such so the caller can write it back); a
//! file that exists but cannot be read or parsed is an error.

use std::path::Path;

use neighbot_types::config::MainConfig;
use neighbot_types::error::ConfigError;

/// Result of loading `main.json`.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: MainConfig,
    /// True when no file existed and defaults were used.
    pub created: bool,
}

/// Load `main.json`, falling back to defaults only when it does not exist.
pub async fn load_main_config(path: &Path) -> Result<LoadedConfig, ConfigError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no main config found, using defaults");
            return Ok(LoadedConfig {
                config: MainConfig::default(),
                created: true,
            });
        }
        Err(err) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                message: err.to_string(),
            });
        }
    };

    let config = serde_json::from_str::<MainConfig>(&content).map_err(|err| ConfigError::Malformed {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    Ok(LoadedConfig {
        config,
        created: false,
    })
}

/// Write `main.json` as pretty-printed JSON, creating parent directories.
pub async fn save_main_config(path: &Path, config: &MainConfig) -> Result<(), ConfigError> {
    let write_err = |message: String| ConfigError::Write {
        path: path.display().to_string(),
        message,
    };
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| write_err(e.to_string()))?;
    }
    let json = serde_json::to_string_pretty(config).map_err(|e| write_err(e.to_string()))?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| write_err(e.to_string()))?;
    tracing::debug!(path = %path.display(), "main config saved");
    Ok(())
}
