//! # keygate-core
//!
//! Core configuration, secret handling, and utilities for Keygate.
//!
//! This crate provides shared functionality used across the Keygate crates:
//!
//! - **Configuration**: Loading, validation, and environment overrides
//! - **Policies**: Access policies attached to secret entries
//! - **Secrets**: A zeroize-on-drop, redacting string type for passwords
//! - **Utilities**: Path resolution and environment handling

pub mod config;
pub mod env;
pub mod error;
pub mod paths;
pub mod policy;
pub mod secret;

// Re-exports for convenience
pub use config::Config;
pub use error::{ConfigError, Error, Result};
pub use policy::{AccessPolicy, Accessibility, Biometry};
pub use secret::SecretString;
