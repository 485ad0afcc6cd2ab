//! Configuration schema definitions.

use crate::policy::AccessPolicy;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Service identifier used when neither the environment nor the config
/// file names one.
pub const FALLBACK_SERVICE: &str = "App";

/// Default session timeout (30 minutes).
pub const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 30 * 60;

/// Default number of failed attempts tolerated per challenge.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

static PROCESS_SERVICE: Lazy<String> = Lazy::new(|| {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| FALLBACK_SERVICE.to_string())
});

/// The process's own service identifier (the executable's file stem).
pub fn process_service_name() -> &'static str {
    &PROCESS_SERVICE
}

/// Main Keygate configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Secret store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Re-authentication session settings.
    #[serde(default)]
    pub session: SessionConfig,
}

/// Secret store configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Service identifier naming the secret namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,

    /// Access group further scoping the namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_group: Option<String>,

    /// Storage backend.
    #[serde(default)]
    pub backend: StoreBackend,

    /// Policy attached to entries written by the account layer.
    #[serde(default)]
    pub default_policy: AccessPolicy,
}

impl StoreConfig {
    /// Effective service identifier: the configured one, else the process's.
    pub fn service_name(&self) -> String {
        self.service
            .clone()
            .unwrap_or_else(|| process_service_name().to_string())
    }
}

/// Which secure-storage capability backs the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// The platform's native store, or in-memory where none is available.
    #[default]
    Native,
    /// Process-local map; nothing survives a restart.
    Memory,
    /// macOS Keychain.
    Keychain,
    /// Cross-platform store through the `keyring` crate.
    Keyring,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StoreBackend::Native => "native",
            StoreBackend::Memory => "memory",
            StoreBackend::Keychain => "keychain",
            StoreBackend::Keyring => "keyring",
        };
        f.write_str(name)
    }
}

/// Re-authentication session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Seconds a successful authentication stays trusted.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Failed attempts tolerated per challenge before a forced sign-out.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl SessionConfig {
    /// Session timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_SESSION_TIMEOUT_SECS
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}
