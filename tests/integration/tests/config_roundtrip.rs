//! Config save/load roundtrip integration tests.
//!
//! These tests verify that configuration can be serialized, written to disk,
//! and loaded back with identical field values, and that a loaded config
//! drives the store and gate it describes.

use keygate_core::config::{Config, StoreBackend};
use keygate_core::{AccessPolicy, Accessibility, Biometry};
use keygate_reauth::{Authenticator, SessionPolicy};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keygate.json5");

    let config = Config::default();
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    // Session defaults should survive the roundtrip
    assert_eq!(loaded.session.timeout_secs, 1800);
    assert_eq!(loaded.session.max_attempts, 5);
    assert_eq!(loaded.store.backend, config.store.backend);
    assert_eq!(loaded.store.default_policy, AccessPolicy::default());
}

#[test]
fn test_config_modify_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("keygate.json5");

    let mut config = Config::default();
    config.store.service = Some("com.example.delivery".to_string());
    config.store.backend = StoreBackend::Memory;
    config.store.default_policy = AccessPolicy::biometric();
    config.session.timeout_secs = 600;
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.store.service.as_deref(), Some("com.example.delivery"));
    assert_eq!(loaded.store.backend, StoreBackend::Memory);
    assert_eq!(loaded.store.default_policy.accessibility, Accessibility::Always);
    assert_eq!(loaded.store.default_policy.biometry, Some(Biometry::Any));
    assert_eq!(loaded.session.timeout(), Duration::from_secs(600));
    assert!(!path.with_extension("tmp").exists());
}

#[test]
fn test_config_load_nonexistent() {
    let result = Config::load(Path::new("/nonexistent/keygate.json5"));
    assert!(result.is_err());
}

#[test]
fn test_config_parse_invalid() {
    let result = Config::parse("not valid json");
    assert!(result.is_err());
}

#[test]
fn test_config_validate_rejects_zero_limits() {
    let config = Config::parse("{ session: { timeout_secs: 0, max_attempts: 0 } }").unwrap();
    let err = config.validate().unwrap_err().to_string();
    assert!(err.contains("timeout_secs"));
    assert!(err.contains("max_attempts"));
}

#[test]
fn test_loaded_config_drives_authenticator() {
    keygate_integration_tests::init_tracing();

    let config = Config::parse(
        r#"{
            // memory backend so the test needs no OS store
            store: { service: "com.example.cfg", backend: "memory" },
            session: { timeout_secs: 120, max_attempts: 2 },
        }"#,
    )
    .unwrap();
    config.validate().unwrap();

    let auth = Authenticator::from_config(&config).unwrap();
    assert_eq!(
        auth.gate().policy(),
        SessionPolicy {
            session_timeout: Duration::from_secs(120),
            max_attempts: 2,
        }
    );
    assert_eq!(auth.vault().store().namespace().service(), "com.example.cfg");

    auth.complete_sign_in("alice", "hunter2").unwrap();
    assert!(!auth.needs_password());
}

#[cfg(not(target_os = "macos"))]
#[test]
fn test_unavailable_backend_is_reported() {
    let config = Config::parse(r#"{ store: { backend: "keychain" } }"#).unwrap();
    let err = Authenticator::from_config(&config).unwrap_err();
    assert!(matches!(
        err,
        keygate_secrets::StoreError::BackendUnavailable(_)
    ));
}
