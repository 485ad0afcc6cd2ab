//! Path resolution utilities.

use crate::env::{self, vars};
use crate::error::ConfigError;
use std::path::PathBuf;

/// Get the Keygate base directory (`$KEYGATE_HOME` or `~/.keygate`).
pub fn base_dir() -> Result<PathBuf, ConfigError> {
    if let Some(home) = env::get_var(vars::KEYGATE_HOME) {
        return Ok(expand_tilde(&home));
    }
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::Validation("Could not determine home directory".to_string())
    })?;
    Ok(home.join(".keygate"))
}

/// Get the main config file path (`$KEYGATE_CONFIG` or `~/.keygate/keygate.json5`).
pub fn config_file() -> Result<PathBuf, ConfigError> {
    if let Some(path) = env::get_var(vars::KEYGATE_CONFIG) {
        return Ok(expand_tilde(&path));
    }
    Ok(base_dir()?.join("keygate.json5"))
}

/// Expand tilde (~) in a path.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
