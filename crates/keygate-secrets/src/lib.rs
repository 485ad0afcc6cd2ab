//! Secret storage for Keygate.
//!
//! [`SecretStore`] is a key/value store for small secrets (tokens,
//! password-equivalents, user ids) on top of an OS-managed secure store.
//! The platform capability is abstracted as [`SecureStorage`], with these
//! backends:
//!
//! - [`MemoryStorage`]: in-process, always available
//! - `KeychainStorage`: macOS Keychain
//! - `KeyringStorage`: any platform supported by `keyring` (feature `keyring`)

pub mod backend;
pub mod dispatch;
pub mod error;
pub mod memory;
pub mod storage;
pub mod store;
pub mod types;

#[cfg(any(target_os = "macos", feature = "keyring", test))]
mod index;
#[cfg(target_os = "macos")]
pub mod keychain;
#[cfg(feature = "keyring")]
pub mod keyring_store;

pub use backend::open_storage;
pub use dispatch::AsyncSecretStore;
pub use error::{Result, StorageError, StoreError};
pub use memory::MemoryStorage;
pub use storage::SecureStorage;
pub use store::SecretStore;
pub use types::{AccessPolicy, Accessibility, Biometry, Namespace};

#[cfg(target_os = "macos")]
pub use keychain::KeychainStorage;
#[cfg(feature = "keyring")]
pub use keyring_store::KeyringStorage;
