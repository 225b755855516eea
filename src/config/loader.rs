use super::ForgeConfig;
use crate::error::{ErrorCode, ForgeError, Result};
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Config file looked up in the working directory when no path is given
pub const CONFIG_FILE_NAME: &str = "protocol-forge.toml";

/// Load configuration from defaults, a TOML file and the environment
///
/// An explicit `path` must exist. Without one, `protocol-forge.toml` in
/// `working_dir` is used when present.
pub async fn load_config(path: Option<&Path>, working_dir: &Path) -> Result<ForgeConfig> {
    let mut config = match path {
        Some(explicit) => {
            if !explicit.exists() {
                return Err(ForgeError::config_with_code(
                    ErrorCode::CONFIG_NOT_FOUND,
                    format!("Configuration file not found: {}", explicit.display()),
                ));
            }
            read_config_file(explicit).await?
        }
        None => {
            let candidate = working_dir.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                read_config_file(&candidate).await?
            } else {
                debug!("No {} found, using defaults", CONFIG_FILE_NAME);
                ForgeConfig::default()
            }
        }
    };

    config.merge_env_vars()?;
    config.validate()?;
    Ok(config)
}

async fn read_config_file(path: &Path) -> Result<ForgeConfig> {
    debug!("Loading configuration from {}", path.display());
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| ForgeError::from(e).with_context(path.display()))?;
    ForgeConfig::from_toml_str(&content).map_err(|e| e.with_context(path.display()))
}
