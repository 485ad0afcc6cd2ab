//! In-process storage backend.

use std::collections::{BTreeMap, HashMap};

use parking_lot::Mutex;
use tracing::trace;
use zeroize::Zeroize;

use crate::error::StorageError;
use crate::storage::SecureStorage;
use crate::types::{AccessPolicy, Namespace};

struct MemoryEntry {
    value: Vec<u8>,
    policy: AccessPolicy,
}

impl Drop for MemoryEntry {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}

/// Secure storage held in process memory.
///
/// Reports the same statuses as the platform stores, so the store logic
/// above it behaves identically. Nothing survives a restart; used for tests
/// and on platforms without a native store.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<Namespace, BTreeMap<String, MemoryEntry>>>,
}

impl MemoryStorage {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Policy an entry was created with.
    pub fn policy_of(&self, namespace: &Namespace, key: &str) -> Option<AccessPolicy> {
        self.entries
            .lock()
            .get(namespace)
            .and_then(|keys| keys.get(key))
            .map(|entry| entry.policy)
    }

    /// Keys currently stored in a namespace, sorted.
    pub fn keys(&self, namespace: &Namespace) -> Vec<String> {
        self.entries
            .lock()
            .get(namespace)
            .map(|keys| keys.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.lock();
        f.debug_struct("MemoryStorage")
            .field("namespaces", &entries.len())
            .field("entries", &entries.values().map(BTreeMap::len).sum::<usize>())
            .finish()
    }
}

impl SecureStorage for MemoryStorage {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn create(
        &self,
        namespace: &Namespace,
        key: &str,
        value: &[u8],
        policy: &AccessPolicy,
    ) -> Result<(), StorageError> {
        let mut entries = self.entries.lock();
        let keys = entries.entry(namespace.clone()).or_default();
        if keys.contains_key(key) {
            return Err(StorageError::DuplicateItem);
        }
        keys.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_vec(),
                policy: *policy,
            },
        );
        trace!(%namespace, key, "memory entry created");
        Ok(())
    }

    fn update(&self, namespace: &Namespace, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let mut entries = self.entries.lock();
        let entry = entries
            .get_mut(namespace)
            .and_then(|keys| keys.get_mut(key))
            .ok_or(StorageError::ItemNotFound)?;
        entry.value.zeroize();
        entry.value = value.to_vec();
        trace!(%namespace, key, "memory entry updated");
        Ok(())
    }

    fn fetch_one(&self, namespace: &Namespace, key: &str) -> Result<Vec<u8>, StorageError> {
        self.entries
            .lock()
            .get(namespace)
            .and_then(|keys| keys.get(key))
            .map(|entry| entry.value.clone())
            .ok_or(StorageError::ItemNotFound)
    }

    fn delete(&self, namespace: &Namespace, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock();
        let keys = entries
            .get_mut(namespace)
            .ok_or(StorageError::ItemNotFound)?;
        keys.remove(key).ok_or(StorageError::ItemNotFound)?;
        if keys.is_empty() {
            entries.remove(namespace);
        }
        Ok(())
    }

    fn delete_all(&self, namespace: &Namespace) -> Result<(), StorageError> {
        match self.entries.lock().remove(namespace) {
            Some(keys) if !keys.is_empty() => Ok(()),
            _ => Err(StorageError::ItemNotFound),
        }
    }
}
