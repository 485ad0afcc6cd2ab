//! Configuration loading and persistence.

use super::Config;
use crate::env::{self, vars};
use crate::error::ConfigError;
use crate::paths;
use std::fs;
use std::path::Path;
use tracing::debug;

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = paths::config_file()?;
        Self::load(&path)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        debug!(path = %path.display(), "loaded config file");
        Self::parse(&content)
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Load the default config file if present, apply environment overrides,
    /// and validate the result.
    ///
    /// A missing file is not an error: defaults plus environment apply.
    pub fn resolve() -> Result<Self, ConfigError> {
        let mut config = match Self::load_default() {
            Ok(config) => config,
            Err(ConfigError::NotFound(path)) => {
                debug!(path = %path.display(), "no config file, using defaults");
                Self::default()
            }
            Err(e) => return Err(e),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json5()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write atomically
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Serialize to JSON5 string.
    pub fn to_json5(&self) -> Result<String, ConfigError> {
        // json5 doesn't have a serializer; plain JSON is valid JSON5
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Override file values with `KEYGATE_*` environment variables.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(service) = env::get_var(vars::KEYGATE_SERVICE) {
            self.store.service = Some(service);
        }
        if let Some(group) = env::get_var(vars::KEYGATE_ACCESS_GROUP) {
            self.store.access_group = Some(group);
        }
        if let Some(secs) = env::get_parsed::<u64>(vars::KEYGATE_SESSION_TIMEOUT_SECS)? {
            self.session.timeout_secs = secs;
        }
        if let Some(max) = env::get_parsed::<u32>(vars::KEYGATE_MAX_ATTEMPTS)? {
            self.session.max_attempts = max;
        }
        Ok(())
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if let Some(service) = &self.store.service {
            if service.trim().is_empty() {
                errors.push("Store service must not be empty".to_string());
            }
        }

        if let Some(group) = &self.store.access_group {
            if group.trim().is_empty() {
                errors.push("Store access_group must not be empty when set".to_string());
            }
        }

        if self.session.timeout_secs == 0 {
            errors.push("Session timeout_secs must be greater than 0".to_string());
        }

        if self.session.max_attempts == 0 {
            errors.push("Session max_attempts must be greater than 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }
}
