//! Environment overrides for configuration.
//!
//! Kept in its own test binary with a single test: the process environment
//! is shared by every test in a binary.

use keygate_core::config::Config;
use keygate_core::env::vars;
use keygate_core::ConfigError;
use std::env;
use tempfile::TempDir;

#[test]
fn test_env_overrides_win_over_file_values() {
    let mut config = Config::parse(
        r#"{
            store: { service: "from.file", access_group: "file-group" },
            session: { timeout_secs: 900, max_attempts: 3 },
        }"#,
    )
    .unwrap();

    env::set_var(vars::KEYGATE_SERVICE, "from.env");
    env::set_var(vars::KEYGATE_SESSION_TIMEOUT_SECS, "60");
    env::set_var(vars::KEYGATE_MAX_ATTEMPTS, " 7 ");
    config.apply_env_overrides().unwrap();

    assert_eq!(config.store.service.as_deref(), Some("from.env"));
    assert_eq!(config.store.access_group.as_deref(), Some("file-group"));
    assert_eq!(config.session.timeout_secs, 60);
    assert_eq!(config.session.max_attempts, 7);

    env::set_var(vars::KEYGATE_MAX_ATTEMPTS, "many");
    let err = config.apply_env_overrides().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnv { ref var, .. } if var == vars::KEYGATE_MAX_ATTEMPTS));

    // resolve() reads the file named by KEYGATE_CONFIG, then applies the
    // environment on top.
    env::remove_var(vars::KEYGATE_MAX_ATTEMPTS);
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keygate.json5");
    std::fs::write(&path, "{ session: { timeout_secs: 900, max_attempts: 4 } }").unwrap();
    env::set_var(vars::KEYGATE_CONFIG, &path);

    let resolved = Config::resolve().unwrap();
    assert_eq!(resolved.store.service.as_deref(), Some("from.env"));
    assert_eq!(resolved.session.timeout_secs, 60);
    assert_eq!(resolved.session.max_attempts, 4);

    env::set_var(vars::KEYGATE_CONFIG, dir.path().join("missing.json5"));
    let defaults = Config::resolve().unwrap();
    assert_eq!(defaults.session.max_attempts, 5);

    env::set_var(vars::KEYGATE_SESSION_TIMEOUT_SECS, "0");
    assert!(matches!(
        Config::resolve(),
        Err(ConfigError::Validation(_))
    ));

    for var in [
        vars::KEYGATE_CONFIG,
        vars::KEYGATE_SERVICE,
        vars::KEYGATE_SESSION_TIMEOUT_SECS,
        vars::KEYGATE_MAX_ATTEMPTS,
    ] {
        env::remove_var(var);
    }
}
