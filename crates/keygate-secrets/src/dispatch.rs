//! Async front for [`SecretStore`].
//!
//! Backend calls block on the OS store (and may wait on a biometric prompt),
//! so each operation runs on tokio's blocking pool.

use tokio::task;
use tracing::warn;

use crate::error::{Result, StoreError};
use crate::store::SecretStore;
use crate::types::{AccessPolicy, Namespace};
use keygate_core::SecretString;

/// [`SecretStore`] whose operations are dispatched to the blocking pool.
#[derive(Debug, Clone)]
pub struct AsyncSecretStore {
    inner: SecretStore,
}

impl AsyncSecretStore {
    /// Wrap a store.
    pub fn new(inner: SecretStore) -> Self {
        Self { inner }
    }

    /// The wrapped blocking store.
    pub fn blocking(&self) -> &SecretStore {
        &self.inner
    }

    /// The namespace this handle addresses.
    pub fn namespace(&self) -> &Namespace {
        self.inner.namespace()
    }

    async fn run<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(SecretStore) -> Result<T> + Send + 'static,
    {
        let store = self.inner.clone();
        task::spawn_blocking(move || op(store))
            .await
            .map_err(|e| StoreError::Dispatch(e.to_string()))?
    }

    /// See [`SecretStore::put`].
    pub async fn put(&self, key: &str, value: Vec<u8>, policy: AccessPolicy) -> Result<()> {
        let key = key.to_string();
        self.run(move |store| store.put(&key, &value, &policy)).await
    }

    /// See [`SecretStore::put_string`].
    pub async fn put_string(&self, key: &str, value: String, policy: AccessPolicy) -> Result<()> {
        let key = key.to_string();
        self.run(move |store| store.put_string(&key, &value, &policy))
            .await
    }

    /// See [`SecretStore::get`].
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let key = key.to_string();
        self.run(move |store| store.get(&key)).await
    }

    /// See [`SecretStore::get_string`].
    pub async fn get_string(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.run(move |store| store.get_string(&key)).await
    }

    /// See [`SecretStore::get_secret`].
    pub async fn get_secret(&self, key: &str) -> Result<Option<SecretString>> {
        let key = key.to_string();
        self.run(move |store| store.get_secret(&key)).await
    }

    /// See [`SecretStore::has`]. A failed dispatch reads as absent.
    pub async fn has(&self, key: &str) -> bool {
        let key = key.to_string();
        match self.run(move |store| Ok(store.has(&key))).await {
            Ok(present) => present,
            Err(e) => {
                warn!(namespace = %self.inner.namespace(), error = %e, "existence probe failed");
                false
            }
        }
    }

    /// See [`SecretStore::remove`].
    pub async fn remove(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.run(move |store| store.remove(&key)).await
    }

    /// See [`SecretStore::remove_all`].
    pub async fn remove_all(&self) -> Result<()> {
        self.run(|store| store.remove_all()).await
    }
}

impl From<SecretStore> for AsyncSecretStore {
    fn from(inner: SecretStore) -> Self {
        Self::new(inner)
    }
}
