//! Persistent key index for backends that cannot enumerate a service.
//!
//! The password APIs of the platform stores address one (service, account)
//! pair at a time, so `delete_all` has no native equivalent there. Those
//! backends record each live key of a namespace in a JSON array stored under
//! a sibling namespace (`<service>.keygate-index`).
//!
//! The index is read-modify-write, so every mutation of an indexed backend
//! goes through the `*_indexed` functions below, which hold the backend's
//! index lock for the whole operation. The index may name a key whose item
//! is gone (erasing it is a no-op) but never misses a live item.

use std::collections::BTreeSet;

use parking_lot::Mutex;
use tracing::warn;

use crate::error::{codes, StorageError};
use crate::types::{AccessPolicy, Namespace};

const INDEX_SUFFIX: &str = "keygate-index";
const INDEX_KEY: &str = "keys";

/// Raw upsert/read/erase primitives a backend exposes to the index.
pub(crate) trait RawEntries {
    /// Read an entry; `Ok(None)` when absent.
    fn read_raw(&self, namespace: &Namespace, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Write an entry, replacing any existing value.
    fn write_raw(&self, namespace: &Namespace, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Erase an entry; absence is not an error.
    fn erase_raw(&self, namespace: &Namespace, key: &str) -> Result<(), StorageError>;
}

/// A backend whose namespace membership is tracked by a [`KeyIndex`].
pub(crate) trait IndexedBackend: RawEntries + Sized {
    /// Lock serializing every index mutation for this backend.
    fn index_lock(&self) -> &Mutex<()>;

    /// Whether an item exists. Called with the index lock held.
    fn item_exists(&self, namespace: &Namespace, key: &str) -> Result<bool, StorageError>;

    /// Write a new item with its access policy.
    fn write_item(
        &self,
        namespace: &Namespace,
        key: &str,
        value: &[u8],
        policy: &AccessPolicy,
    ) -> Result<(), StorageError>;
}

/// Key bookkeeping for one namespace. Callers hold the backend's index lock.
pub(crate) struct KeyIndex<'a, R: RawEntries> {
    raw: &'a R,
    location: Namespace,
}

impl<'a, R: RawEntries> KeyIndex<'a, R> {
    pub(crate) fn new(raw: &'a R, namespace: &Namespace) -> Self {
        Self {
            raw,
            location: namespace.sibling(INDEX_SUFFIX),
        }
    }

    /// Keys currently recorded.
    pub(crate) fn load(&self) -> Result<BTreeSet<String>, StorageError> {
        match self.raw.read_raw(&self.location, INDEX_KEY)? {
            None => Ok(BTreeSet::new()),
            Some(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                warn!(namespace = %self.location, error = %e, "key index is corrupt");
                StorageError::failure(codes::CORRUPT_INDEX, format!("corrupt key index: {e}"))
            }),
        }
    }

    pub(crate) fn contains(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.load()?.contains(key))
    }

    pub(crate) fn insert(&self, key: &str) -> Result<(), StorageError> {
        let mut keys = self.load()?;
        if keys.insert(key.to_string()) {
            self.save(&keys)?;
        }
        Ok(())
    }

    pub(crate) fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut keys = self.load()?;
        if keys.remove(key) {
            self.save(&keys)?;
        }
        Ok(())
    }

    /// Replace the recorded keys. An empty set erases the index entry.
    pub(crate) fn save(&self, keys: &BTreeSet<String>) -> Result<(), StorageError> {
        if keys.is_empty() {
            return self.raw.erase_raw(&self.location, INDEX_KEY);
        }
        let bytes = serde_json::to_vec(keys).map_err(|e| {
            StorageError::failure(codes::CORRUPT_INDEX, format!("encode key index: {e}"))
        })?;
        self.raw.write_raw(&self.location, INDEX_KEY, &bytes)
    }
}

/// Create an item, recording it in the index first.
///
/// A failed write takes the key back out of the index.
pub(crate) fn create_indexed<B: IndexedBackend>(
    backend: &B,
    namespace: &Namespace,
    key: &str,
    value: &[u8],
    policy: &AccessPolicy,
) -> Result<(), StorageError> {
    let _guard = backend.index_lock().lock();
    if backend.item_exists(namespace, key)? {
        return Err(StorageError::DuplicateItem);
    }

    let index = KeyIndex::new(backend, namespace);
    index.insert(key)?;
    if let Err(e) = backend.write_item(namespace, key, value, policy) {
        if let Err(rollback) = index.remove(key) {
            warn!(%namespace, key, error = %rollback, "failed to unindex unwritten item");
        }
        return Err(e);
    }
    Ok(())
}

/// Replace the value of an existing item.
pub(crate) fn update_indexed<B: IndexedBackend>(
    backend: &B,
    namespace: &Namespace,
    key: &str,
    value: &[u8],
) -> Result<(), StorageError> {
    let _guard = backend.index_lock().lock();
    if !backend.item_exists(namespace, key)? {
        return Err(StorageError::ItemNotFound);
    }
    backend.write_raw(namespace, key, value)
}

/// Fetch one item.
pub(crate) fn fetch_indexed<B: IndexedBackend>(
    backend: &B,
    namespace: &Namespace,
    key: &str,
) -> Result<Vec<u8>, StorageError> {
    backend
        .read_raw(namespace, key)?
        .ok_or(StorageError::ItemNotFound)
}

/// Erase one item, then drop it from the index.
pub(crate) fn delete_indexed<B: IndexedBackend>(
    backend: &B,
    namespace: &Namespace,
    key: &str,
) -> Result<(), StorageError> {
    let _guard = backend.index_lock().lock();
    let existed = backend.item_exists(namespace, key)?;
    backend.erase_raw(namespace, key)?;
    KeyIndex::new(backend, namespace).remove(key)?;
    if existed {
        Ok(())
    } else {
        Err(StorageError::ItemNotFound)
    }
}

/// Erase every indexed item of a namespace.
///
/// Keys whose erase fails stay in the index so a later call can retry them;
/// the first failure is returned.
pub(crate) fn delete_all_indexed<B: IndexedBackend>(
    backend: &B,
    namespace: &Namespace,
) -> Result<(), StorageError> {
    let _guard = backend.index_lock().lock();
    let index = KeyIndex::new(backend, namespace);
    let keys = index.load()?;
    if keys.is_empty() {
        return Err(StorageError::ItemNotFound);
    }

    let mut remaining = BTreeSet::new();
    let mut first_error = None;
    for key in keys {
        if let Err(e) = backend.erase_raw(namespace, &key) {
            warn!(%namespace, key = %key, error = %e, "failed to erase item, keeping it indexed");
            first_error.get_or_insert(e);
            remaining.insert(key);
        }
    }
    index.save(&remaining)?;

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
