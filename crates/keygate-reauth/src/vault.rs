//! Persisted account credentials.

use keygate_core::config::StoreConfig;
use keygate_core::SecretString;
use keygate_secrets::{AccessPolicy, Result, SecretStore, StoreError};
use tracing::{debug, warn};

/// Key under which the signed-in user's id is stored.
pub const USER_ID_KEY: &str = "userId";

/// The signed-in account's id and password-equivalent, kept in a
/// [`SecretStore`].
///
/// The id lives under [`USER_ID_KEY`] and the password under the id itself.
#[derive(Debug, Clone)]
pub struct AccountVault {
    store: SecretStore,
    policy: AccessPolicy,
}

impl AccountVault {
    /// Vault over `store`, writing new entries with `policy`.
    pub fn new(store: SecretStore, policy: AccessPolicy) -> Self {
        Self { store, policy }
    }

    /// Open the configured store and use its default policy.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        Ok(Self::new(
            SecretStore::from_config(config)?,
            config.default_policy,
        ))
    }

    /// The underlying store.
    pub fn store(&self) -> &SecretStore {
        &self.store
    }

    /// Policy attached to newly created entries.
    pub fn policy(&self) -> AccessPolicy {
        self.policy
    }

    /// Persist an account's id and password.
    pub fn save_credentials(&self, user_id: &str, password: &str) -> Result<()> {
        if user_id.is_empty() {
            return Err(StoreError::InvalidKey("user id must not be empty".to_string()));
        }
        if user_id == USER_ID_KEY {
            return Err(StoreError::InvalidKey(format!(
                "user id collides with the reserved key {USER_ID_KEY:?}"
            )));
        }
        self.store.put_string(USER_ID_KEY, user_id, &self.policy)?;
        self.store.put_string(user_id, password, &self.policy)?;
        debug!(namespace = %self.store.namespace(), "credentials saved");
        Ok(())
    }

    /// Id of the stored account. Store errors read as no account.
    pub fn user_id(&self) -> Option<String> {
        match self.store.get_string(USER_ID_KEY) {
            Ok(user_id) => user_id.filter(|id| !id.is_empty()),
            Err(e) => {
                warn!(error = %e, "failed to read stored user id");
                None
            }
        }
    }

    /// Stored password for `user_id`. Store errors read as no password.
    pub fn password_for(&self, user_id: &str) -> Option<SecretString> {
        match self.store.get_secret(user_id) {
            Ok(password) => password,
            Err(e) => {
                warn!(error = %e, "failed to read stored password");
                None
            }
        }
    }

    /// Whether both the account id and its password are stored.
    pub fn has_credentials(&self) -> bool {
        self.user_id().is_some_and(|user_id| self.store.has(&user_id))
    }

    /// Delete everything in the vault's namespace.
    pub fn clear(&self) -> Result<()> {
        self.store.remove_all()
    }
}
