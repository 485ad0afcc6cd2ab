//! Access policies attached to secret entries at creation time.
//!
//! A policy is opaque to the store logic: it is handed to the storage
//! backend on create and never consulted again. Backends that have no
//! equivalent for a field (biometry on most non-Apple platforms) ignore it.

use serde::{Deserialize, Serialize};

/// When an entry may be read by the owning process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    /// Readable regardless of device lock state.
    Always,
    /// Readable after the first unlock following a restart.
    AfterFirstUnlock,
    /// As `AfterFirstUnlock`, never migrated to another device.
    AfterFirstUnlockThisDeviceOnly,
    /// Readable only while the device is unlocked.
    #[default]
    WhenUnlocked,
    /// As `WhenUnlocked`, never migrated to another device.
    WhenUnlockedThisDeviceOnly,
    /// Requires a device passcode; removed if the passcode is removed.
    WhenPasscodeSetThisDeviceOnly,
}

/// Biometric gate required to read an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Biometry {
    /// Any enrolled biometric.
    Any,
    /// Only the biometric set enrolled when the entry was created.
    CurrentSet,
}

/// Access control attached to an entry when it is created.
///
/// Immutable afterwards: overwriting an existing entry replaces its value
/// and keeps the policy it was created with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessPolicy {
    /// Lock-state accessibility class.
    #[serde(default)]
    pub accessibility: Accessibility,

    /// Optional biometric gate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biometry: Option<Biometry>,
}

impl AccessPolicy {
    /// Always accessible, gated by any enrolled biometric.
    pub fn biometric() -> Self {
        Self {
            accessibility: Accessibility::Always,
            biometry: Some(Biometry::Any),
        }
    }

    /// Set the accessibility class.
    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    /// Require a biometric gate.
    pub fn with_biometry(mut self, biometry: Biometry) -> Self {
        self.biometry = Some(biometry);
        self
    }

    /// Whether reading the entry requires a biometric prompt.
    pub fn requires_biometry(&self) -> bool {
        self.biometry.is_some()
    }
}
