//! macOS Keychain backend (Security.framework).
//!
//! Entries are generic passwords addressed by (qualified service, key). The
//! biometric part of an [`AccessPolicy`] becomes access-control flags on the
//! item when it is created; the accessibility class is left to the
//! keychain's default since the password API does not expose it.
//!
//! Existence is decided from the key index rather than by reading the item:
//! reading a biometric-gated item would prompt the user.

use parking_lot::{const_mutex, Mutex};
use security_framework::base::Error as SecError;
use security_framework::passwords::{
    delete_generic_password, get_generic_password, set_generic_password,
    set_generic_password_options,
};
use security_framework::passwords_options::{AccessControlOptions, PasswordOptions};
use tracing::debug;

use crate::error::{codes, StorageError};
use crate::index::{self, IndexedBackend, KeyIndex, RawEntries};
use crate::storage::SecureStorage;
use crate::types::{AccessPolicy, Biometry, Namespace};

/// Serializes index updates. The keychain is shared by every handle in the
/// process.
static INDEX_LOCK: Mutex<()> = const_mutex(());

/// Secure storage backed by the macOS Keychain.
#[derive(Debug, Clone, Default)]
pub struct KeychainStorage;

impl KeychainStorage {
    /// Create a new Keychain backend.
    pub fn new() -> Self {
        Self
    }
}

impl RawEntries for KeychainStorage {
    fn read_raw(&self, namespace: &Namespace, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match get_generic_password(&namespace.qualified_service(), key) {
            Ok(data) => Ok(Some(data.to_vec())),
            Err(e) if e.code() == codes::ITEM_NOT_FOUND => Ok(None),
            Err(e) => Err(map_error(e)),
        }
    }

    fn write_raw(&self, namespace: &Namespace, key: &str, value: &[u8]) -> Result<(), StorageError> {
        set_generic_password(&namespace.qualified_service(), key, value).map_err(map_error)
    }

    fn erase_raw(&self, namespace: &Namespace, key: &str) -> Result<(), StorageError> {
        match delete_generic_password(&namespace.qualified_service(), key) {
            Ok(()) => Ok(()),
            Err(e) if e.code() == codes::ITEM_NOT_FOUND => Ok(()),
            Err(e) => Err(map_error(e)),
        }
    }
}

impl IndexedBackend for KeychainStorage {
    fn index_lock(&self) -> &Mutex<()> {
        &INDEX_LOCK
    }

    fn item_exists(&self, namespace: &Namespace, key: &str) -> Result<bool, StorageError> {
        KeyIndex::new(self, namespace).contains(key)
    }

    fn write_item(
        &self,
        namespace: &Namespace,
        key: &str,
        value: &[u8],
        policy: &AccessPolicy,
    ) -> Result<(), StorageError> {
        let service = namespace.qualified_service();
        match policy.biometry {
            Some(biometry) => {
                let mut options = PasswordOptions::new_generic_password(&service, key);
                options.set_access_control_options(access_control(biometry));
                set_generic_password_options(value, options).map_err(map_error)?;
            }
            None => set_generic_password(&service, key, value).map_err(map_error)?,
        }
        debug!(%namespace, key, accessibility = ?policy.accessibility, "keychain item created");
        Ok(())
    }
}

impl SecureStorage for KeychainStorage {
    fn name(&self) -> &'static str {
        "keychain"
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
        debug!(%namespace, "keychain namespace cleared");
        Ok(())
    }
}

fn access_control(biometry: Biometry) -> AccessControlOptions {
    match biometry {
        Biometry::Any => AccessControlOptions::BIOMETRY_ANY,
        Biometry::CurrentSet => AccessControlOptions::BIOMETRY_CURRENT_SET,
    }
}

fn map_error(err: SecError) -> StorageError {
    match err.code() {
        codes::ITEM_NOT_FOUND => StorageError::ItemNotFound,
        codes::DUPLICATE_ITEM => StorageError::DuplicateItem,
        code => StorageError::failure(code, err.to_string()),
    }
}
