//! Shared helpers for the integration test binaries.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Once};

use keygate_reauth::{AccountVault, Authenticator, ManualClock, ReAuthenticationGate, SessionPolicy};
use keygate_secrets::{
    AccessPolicy, MemoryStorage, Namespace, SecretStore, SecureStorage, StorageError,
};
use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Route tracing output through the test harness, filtered by `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}

/// A store over a fresh in-memory backend, plus the backend for inspection.
pub fn memory_store(service: &str) -> (SecretStore, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let store = SecretStore::new(storage.clone(), Namespace::new(service));
    (store, storage)
}

/// An authenticator over an in-memory store with a manually driven clock.
pub fn manual_authenticator(policy: SessionPolicy) -> (Authenticator, Arc<ManualClock>) {
    let (store, _) = memory_store("com.example.integration");
    let vault = AccountVault::new(store, AccessPolicy::biometric());
    let clock = Arc::new(ManualClock::new());
    let gate = ReAuthenticationGate::with_clock(vault.clone(), policy, clock.clone());
    (Authenticator::new(Arc::new(gate), vault), clock)
}

/// In-memory backend whose next namespace wipe pauses until released.
///
/// [`HeldWipe::hold`] arms the pause and returns a receiver that fires once
/// the wipe has started, plus a sender that lets it finish.
#[derive(Debug, Default)]
pub struct HeldWipe {
    inner: MemoryStorage,
    held: Mutex<Option<(Sender<()>, Receiver<()>)>>,
}

impl HeldWipe {
    pub fn hold(&self) -> (Receiver<()>, Sender<()>) {
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        *self.held.lock() = Some((started_tx, release_rx));
        (started_rx, release_tx)
    }
}

type Status<T> = Result<T, StorageError>;

impl SecureStorage for HeldWipe {
    fn name(&self) -> &'static str {
        "held-wipe"
    }

    fn create(&self, ns: &Namespace, key: &str, value: &[u8], policy: &AccessPolicy) -> Status<()> {
        self.inner.create(ns, key, value, policy)
    }

    fn update(&self, ns: &Namespace, key: &str, value: &[u8]) -> Status<()> {
        self.inner.update(ns, key, value)
    }

    fn fetch_one(&self, ns: &Namespace, key: &str) -> Status<Vec<u8>> {
        self.inner.fetch_one(ns, key)
    }

    fn delete(&self, ns: &Namespace, key: &str) -> Status<()> {
        self.inner.delete(ns, key)
    }

    fn delete_all(&self, ns: &Namespace) -> Status<()> {
        let held = self.held.lock().take();
        if let Some((started, release)) = held {
            let _ = started.send(());
            let _ = release.recv();
        }
        self.inner.delete_all(ns)
    }
}

/// An authenticator over a [`HeldWipe`] backend.
pub fn held_wipe_authenticator() -> (Authenticator, Arc<HeldWipe>) {
    let storage = Arc::new(HeldWipe::default());
    let store = SecretStore::new(storage.clone(), Namespace::new("com.example.held"));
    let vault = AccountVault::new(store, AccessPolicy::default());
    let gate = ReAuthenticationGate::new(vault.clone(), SessionPolicy::default());
    (Authenticator::new(Arc::new(gate), vault), storage)
}
