//! The secure-storage capability consumed by [`crate::SecretStore`].
//!
//! Backends mirror the platform primitive as-is, including its add-vs-update
//! split: `create` on an existing key reports [`StorageError::DuplicateItem`]
//! and `update`/`delete` on a missing key report
//! [`StorageError::ItemNotFound`]. Reconciling those statuses into a single
//! CRUD contract is the store's job, not the backend's.

use std::fmt;

use crate::error::StorageError;
use crate::types::{AccessPolicy, Namespace};

/// Blocking interface to an OS-managed secure store.
pub trait SecureStorage: Send + Sync + fmt::Debug {
    /// Short backend name used in logs.
    fn name(&self) -> &'static str;

    /// Add a new entry with its access policy.
    fn create(
        &self,
        namespace: &Namespace,
        key: &str,
        value: &[u8],
        policy: &AccessPolicy,
    ) -> Result<(), StorageError>;

    /// Replace the value of an existing entry. The policy is left unchanged.
    fn update(&self, namespace: &Namespace, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Fetch at most one matching entry.
    ///
    /// Absence is reported as [`StorageError::ItemNotFound`].
    fn fetch_one(&self, namespace: &Namespace, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Delete one entry.
    fn delete(&self, namespace: &Namespace, key: &str) -> Result<(), StorageError>;

    /// Delete every entry in the namespace.
    ///
    /// An already empty namespace reports [`StorageError::ItemNotFound`].
    fn delete_all(&self, namespace: &Namespace) -> Result<(), StorageError>;
}
