//! Backend selection.

use std::sync::Arc;

use keygate_core::config::StoreBackend;
use tracing::{info, warn};

use crate::error::{Result, StoreError};
use crate::memory::MemoryStorage;
use crate::storage::SecureStorage;

/// Open the secure-storage capability named by the configuration.
///
/// `Native` picks the platform store when one is compiled in and falls back
/// to [`MemoryStorage`] otherwise. Naming a backend that is not available in
/// this build fails with [`StoreError::BackendUnavailable`].
pub fn open_storage(backend: StoreBackend) -> Result<Arc<dyn SecureStorage>> {
    let storage: Arc<dyn SecureStorage> = match backend {
        StoreBackend::Native => native_storage(),
        StoreBackend::Memory => Arc::new(MemoryStorage::new()),
        StoreBackend::Keychain => keychain_storage()?,
        StoreBackend::Keyring => keyring_storage()?,
    };
    info!(requested = %backend, backend = storage.name(), "secure storage opened");
    Ok(storage)
}

fn native_storage() -> Arc<dyn SecureStorage> {
    if let Ok(storage) = keychain_storage() {
        return storage;
    }
    if let Ok(storage) = keyring_storage() {
        return storage;
    }
    warn!("no platform secure store in this build, secrets will not survive a restart");
    Arc::new(MemoryStorage::new())
}

#[cfg(target_os = "macos")]
fn keychain_storage() -> Result<Arc<dyn SecureStorage>> {
    Ok(Arc::new(crate::keychain::KeychainStorage::new()))
}

#[cfg(not(target_os = "macos"))]
fn keychain_storage() -> Result<Arc<dyn SecureStorage>> {
    Err(StoreError::BackendUnavailable(
        "the keychain backend is only available on macOS".to_string(),
    ))
}

#[cfg(feature = "keyring")]
fn keyring_storage() -> Result<Arc<dyn SecureStorage>> {
    Ok(Arc::new(crate::keyring_store::KeyringStorage::new()))
}

#[cfg(not(feature = "keyring"))]
fn keyring_storage() -> Result<Arc<dyn SecureStorage>> {
    Err(StoreError::BackendUnavailable(
        "built without the `keyring` feature".to_string(),
    ))
}
