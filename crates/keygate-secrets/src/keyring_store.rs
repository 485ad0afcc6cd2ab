//! Cross-platform backend through the `keyring` crate.
//!
//! Entries map to keyring credentials addressed by (qualified service, key).
//! The keyring API only offers upsert, so `create` probes for an existing
//! credential to report the duplicate-item status the store expects.

use parking_lot::{const_mutex, Mutex};
use tracing::{debug, warn};

use crate::error::{codes, StorageError};
use crate::index::{self, IndexedBackend, RawEntries};
use crate::storage::SecureStorage;
use crate::types::{AccessPolicy, Namespace};

/// Serializes index updates. The credential store is shared by every handle
/// in the process.
static INDEX_LOCK: Mutex<()> = const_mutex(());

/// Secure storage backed by the platform credential store via `keyring`.
#[derive(Debug, Clone, Default)]
pub struct KeyringStorage;

impl KeyringStorage {
    /// Create a new keyring backend.
    pub fn new() -> Self {
        Self
    }

    fn entry(namespace: &Namespace, key: &str) -> Result<keyring::Entry, StorageError> {
        keyring::Entry::new(&namespace.qualified_service(), key).map_err(map_error)
    }

    fn read(namespace: &Namespace, key: &str) -> Result<Vec<u8>, StorageError> {
        match Self::entry(namespace, key)?.get_secret() {
            Ok(secret) => Ok(secret),
            Err(keyring::Error::Ambiguous(credentials)) => {
                warn!(
                    %namespace,
                    key,
                    matches = credentials.len(),
                    "multiple credentials match, using the first"
                );
                credentials
                    .first()
                    .ok_or(StorageError::ItemNotFound)?
                    .get_secret()
                    .map_err(map_error)
            }
            Err(e) => Err(map_error(e)),
        }
    }
}

impl RawEntries for KeyringStorage {
    fn read_raw(&self, namespace: &Namespace, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match Self::read(namespace, key) {
            Ok(value) => Ok(Some(value)),
            Err(StorageError::ItemNotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write_raw(&self, namespace: &Namespace, key: &str, value: &[u8]) -> Result<(), StorageError> {
        Self::entry(namespace, key)?
            .set_secret(value)
            .map_err(map_error)
    }

    fn erase_raw(&self, namespace: &Namespace, key: &str) -> Result<(), StorageError> {
        match Self::entry(namespace, key)?
            .delete_credential()
            .map_err(map_error)
        {
            Ok(()) | Err(StorageError::ItemNotFound) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl IndexedBackend for KeyringStorage {
    fn index_lock(&self) -> &Mutex<()> {
        &INDEX_LOCK
    }

    // Ask the store itself so credentials written before indexing count.
    fn item_exists(&self, namespace: &Namespace, key: &str) -> Result<bool, StorageError> {
        Ok(self.read_raw(namespace, key)?.is_some())
    }

    fn write_item(
        &self,
        namespace: &Namespace,
        key: &str,
        value: &[u8],
        policy: &AccessPolicy,
    ) -> Result<(), StorageError> {
        if policy.biometry.is_some() {
            debug!(%namespace, key, "keyring has no biometric gate, storing without one");
        }
        self.write_raw(namespace, key, value)
    }
}

impl SecureStorage for KeyringStorage {
    fn name(&self) -> &'static str {
        "keyring"
    }

    fn create(
        &self,
        namespace: &Namespace,
        key: &str,
        value: &[u8],
        policy: &AccessPolicy,
    ) -> Result<(), StorageError> {
        index::create_indexed(self, namespace, key, value, policy)
    }

    fn update(&self, namespace: &Namespace, key: &str, value: &[u8]) -> Result<(), StorageError> {
        index::update_indexed(self, namespace, key, value)
    }

    fn fetch_one(&self, namespace: &Namespace, key: &str) -> Result<Vec<u8>, StorageError> {
        index::fetch_indexed(self, namespace, key)
    }

    fn delete(&self, namespace: &Namespace, key: &str) -> Result<(), StorageError> {
        index::delete_indexed(self, namespace, key)
    }

    fn delete_all(&self, namespace: &Namespace) -> Result<(), StorageError> {
        index::delete_all_indexed(self, namespace)?;
        debug!(%namespace, "keyring namespace cleared");
        Ok(())
    }
}

fn map_error(err: keyring::Error) -> StorageError {
    match err {
        keyring::Error::NoEntry => StorageError::ItemNotFound,
        keyring::Error::NoStorageAccess(e) => {
            StorageError::failure(codes::NO_STORAGE_ACCESS, e.to_string())
        }
        keyring::Error::PlatformFailure(e) => {
            StorageError::failure(codes::PLATFORM_FAILURE, e.to_string())
        }
        e @ (keyring::Error::BadEncoding(_)
        | keyring::Error::TooLong(..)
        | keyring::Error::Invalid(..)) => {
            StorageError::failure(codes::INVALID_ATTRIBUTE, e.to_string())
        }
        e => StorageError::failure(codes::PLATFORM_FAILURE, e.to_string()),
    }
}
