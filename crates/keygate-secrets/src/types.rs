//! Core types for secret storage.

use keygate_core::config::StoreConfig;
use std::fmt;

pub use keygate_core::policy::{AccessPolicy, Accessibility, Biometry};

/// Logical partition of secret entries.
///
/// Usually one per application identity. At most one live entry exists per
/// (namespace, key) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace {
    service: String,
    access_group: Option<String>,
}

impl Namespace {
    /// Namespace for a service identifier.
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            access_group: None,
        }
    }

    /// Narrow the namespace to an access group.
    pub fn with_access_group(mut self, group: impl Into<String>) -> Self {
        self.access_group = Some(group.into());
        self
    }

    /// Namespace described by the store configuration.
    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            service: config.service_name(),
            access_group: config.access_group.clone(),
        }
    }

    /// Namespace named after the running executable.
    pub fn process_default() -> Self {
        Self::new(keygate_core::config::process_service_name())
    }

    /// Service identifier.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Access group, if any.
    pub fn access_group(&self) -> Option<&str> {
        self.access_group.as_deref()
    }

    /// Service string for backends without a separate access-group attribute.
    #[cfg_attr(not(any(target_os = "macos", feature = "keyring")), allow(dead_code))]
    pub(crate) fn qualified_service(&self) -> String {
        match &self.access_group {
            Some(group) => format!("{group}/{}", self.service),
            None => self.service.clone(),
        }
    }

    /// Sibling namespace holding bookkeeping entries for this one.
    #[cfg_attr(not(any(target_os = "macos", feature = "keyring")), allow(dead_code))]
    pub(crate) fn sibling(&self, suffix: &str) -> Self {
        Self {
            service: format!("{}.{suffix}", self.service),
            access_group: self.access_group.clone(),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.access_group {
            Some(group) => write!(f, "{} [{group}]", self.service),
            None => f.write_str(&self.service),
        }
    }
}
