//! The secret store.
//!
//! [`SecretStore`] turns the add/update/fetch/delete primitives of a
//! [`SecureStorage`] backend into a small CRUD contract:
//!
//! - writes are upserts: a duplicate-item status on create falls back to an
//!   update of the existing entry, leaving its access policy untouched
//! - reads of a missing key return `None`
//! - deletes are idempotent
//!
//! No values are cached in process; every call round-trips to the backend.

use std::ffi::OsStr;
use std::fmt;
use std::sync::Arc;

use keygate_core::config::StoreConfig;
use keygate_core::SecretString;
use tracing::{debug, warn};

use crate::backend::open_storage;
use crate::error::{Result, StorageError, StoreError};
use crate::memory::MemoryStorage;
use crate::storage::SecureStorage;
use crate::types::{AccessPolicy, Namespace};

/// Handle to secrets in one namespace.
///
/// Cloning is cheap; clones share the backend.
#[derive(Clone)]
pub struct SecretStore {
    storage: Arc<dyn SecureStorage>,
    namespace: Namespace,
}

impl SecretStore {
    /// Create a store over a backend and namespace.
    pub fn new(storage: Arc<dyn SecureStorage>, namespace: Namespace) -> Self {
        Self { storage, namespace }
    }

    /// Store over a fresh [`MemoryStorage`].
    pub fn in_memory(namespace: Namespace) -> Self {
        Self::new(Arc::new(MemoryStorage::new()), namespace)
    }

    /// Open the configured backend and namespace.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        let storage = open_storage(config.backend)?;
        Ok(Self::new(storage, Namespace::from_config(config)))
    }

    /// The namespace this handle addresses.
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Handle on the same backend addressing another namespace.
    pub fn scoped(&self, namespace: Namespace) -> Self {
        Self::new(Arc::clone(&self.storage), namespace)
    }

    /// Store `value` under `key`, replacing any existing value.
    ///
    /// `policy` applies only when the entry is created; an existing entry
    /// keeps the policy it was created with.
    pub fn put(&self, key: &str, value: &[u8], policy: &AccessPolicy) -> Result<()> {
        validate_key(key)?;
        let ns = &self.namespace;

        match self.storage.create(ns, key, value, policy) {
            Ok(()) => {
                debug!(namespace = %ns, key, "secret created");
                return Ok(());
            }
            Err(StorageError::DuplicateItem) => {}
            Err(e) => return Err(e.into()),
        }

        match self.storage.update(ns, key, value) {
            Ok(()) => {
                debug!(namespace = %ns, key, "secret updated");
                Ok(())
            }
            // Deleted between our create and update.
            Err(StorageError::ItemNotFound) => {
                debug!(namespace = %ns, key, "secret vanished during update, recreating");
                self.storage.create(ns, key, value, policy)?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Store a string as UTF-8.
    pub fn put_string(&self, key: &str, value: &str, policy: &AccessPolicy) -> Result<()> {
        self.put(key, value.as_bytes(), policy)
    }

    /// Store a platform string. Fails with [`StoreError::EncodingFailed`] if
    /// it is not valid Unicode.
    pub fn put_os_str(&self, key: &str, value: &OsStr, policy: &AccessPolicy) -> Result<()> {
        let value = value.to_str().ok_or(StoreError::EncodingFailed)?;
        self.put_string(key, value, policy)
    }

    /// Fetch the value stored under `key`.
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        validate_key(key)?;
        match self.storage.fetch_one(&self.namespace, key) {
            Ok(value) => Ok(Some(value)),
            Err(StorageError::ItemNotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch and decode a UTF-8 value.
    pub fn get_string(&self, key: &str) -> Result<Option<String>> {
        match self.get(key)? {
            Some(bytes) => Ok(Some(String::from_utf8(bytes)?)),
            None => Ok(None),
        }
    }

    /// Fetch a UTF-8 value as a [`SecretString`].
    pub fn get_secret(&self, key: &str) -> Result<Option<SecretString>> {
        Ok(self.get_string(key)?.map(SecretString::from))
    }

    /// Whether an entry exists under `key`.
    ///
    /// Never fails: any error while probing reads as absent.
    pub fn has(&self, key: &str) -> bool {
        match self.get(key) {
            Ok(value) => value.is_some(),
            Err(e) => {
                warn!(namespace = %self.namespace, key, error = %e, "existence probe failed");
                false
            }
        }
    }

    /// Delete the entry under `key`. Deleting a missing key succeeds.
    pub fn remove(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        match self.storage.delete(&self.namespace, key) {
            Ok(()) => {
                debug!(namespace = %self.namespace, key, "secret removed");
                Ok(())
            }
            Err(StorageError::ItemNotFound) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete every entry in this namespace.
    pub fn remove_all(&self) -> Result<()> {
        match self.storage.delete_all(&self.namespace) {
            Ok(()) => {
                debug!(namespace = %self.namespace, "all secrets removed");
                Ok(())
            }
            Err(StorageError::ItemNotFound) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl fmt::Debug for SecretStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretStore")
            .field("backend", &self.storage.name())
            .field("namespace", &self.namespace)
            .finish()
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey("key must not be empty".to_string()));
    }
    Ok(())
}
