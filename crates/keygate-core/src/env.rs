//! Environment variable handling.

use crate::error::ConfigError;
use std::env;
use std::str::FromStr;

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
pub fn get_var_or(name: &str, default: &str) -> String {
    get_var(name).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable.
///
/// Unset or empty variables yield `Ok(None)`; a value that fails to parse is
/// an error rather than being silently ignored.
pub fn get_parsed<T: FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match get_var(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                var: name.to_string(),
                value: raw,
            }),
    }
}

/// Environment variable names understood by Keygate.
pub mod vars {
    /// Keygate home directory override.
    pub const KEYGATE_HOME: &str = "KEYGATE_HOME";

    /// Keygate config file override.
    pub const KEYGATE_CONFIG: &str = "KEYGATE_CONFIG";

    /// Service identifier used as the default secret namespace.
    pub const KEYGATE_SERVICE: &str = "KEYGATE_SERVICE";

    /// Optional access group narrowing the namespace.
    pub const KEYGATE_ACCESS_GROUP: &str = "KEYGATE_ACCESS_GROUP";

    /// Session timeout in seconds.
    pub const KEYGATE_SESSION_TIMEOUT_SECS: &str = "KEYGATE_SESSION_TIMEOUT_SECS";

    /// Failed attempts allowed per challenge.
    pub const KEYGATE_MAX_ATTEMPTS: &str = "KEYGATE_MAX_ATTEMPTS";
}
