//! Sign-in and sign-out orchestration around the gate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use keygate_core::Config;
use keygate_secrets::Result;
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::challenge::{AuthState, Challenge};
use crate::gate::{ReAuthenticationGate, SessionPolicy};
use crate::vault::AccountVault;

/// Ties the gate to the stored account: records sign-ins, clears
/// everything on sign-out and hands out password challenges.
#[derive(Debug)]
pub struct Authenticator {
    gate: Arc<ReAuthenticationGate>,
    vault: AccountVault,
    locked_out: AtomicBool,
    lock: Mutex<()>,
}

impl Authenticator {
    /// Orchestrator over `gate` and the vault it verifies against.
    pub fn new(gate: Arc<ReAuthenticationGate>, vault: AccountVault) -> Self {
        Self {
            gate,
            vault,
            locked_out: AtomicBool::new(false),
            lock: Mutex::new(()),
        }
    }

    /// Build the store, vault and gate described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let vault = AccountVault::from_config(&config.store)?;
        let gate = ReAuthenticationGate::new(vault.clone(), SessionPolicy::from(&config.session));
        Ok(Self::new(Arc::new(gate), vault))
    }

    /// The shared re-authentication gate.
    pub fn gate(&self) -> &Arc<ReAuthenticationGate> {
        &self.gate
    }

    /// The stored account.
    pub fn vault(&self) -> &AccountVault {
        &self.vault
    }

    /// Record a successful sign-in and start a trust window.
    ///
    /// Credentials are written when the vault holds none for `user_id` or
    /// the stored password differs. Signing in as a different user first
    /// clears the previous account.
    pub fn complete_sign_in(&self, user_id: &str, password: &str) -> Result<()> {
        let _guard = self.lock.lock();

        match self.vault.user_id() {
            Some(stored) if stored == user_id => {
                let unchanged = self
                    .vault
                    .password_for(user_id)
                    .is_some_and(|stored| stored.matches(password));
                if !unchanged {
                    self.vault.save_credentials(user_id, password)?;
                    info!("stored password updated");
                }
            }
            Some(_) => {
                self.vault.clear()?;
                self.vault.save_credentials(user_id, password)?;
                info!("account switched, previous credentials cleared");
            }
            None => {
                self.vault.save_credentials(user_id, password)?;
                info!("credentials stored for new sign-in");
            }
        }

        self.locked_out.store(false, Ordering::SeqCst);
        self.gate.update_last_auth_time();
        Ok(())
    }

    /// End the session and delete the stored account.
    ///
    /// The trust window is always ended, even when clearing the store fails.
    /// Clearing and ending the window happen under the gate's session lock,
    /// so no verification can land between them.
    pub fn sign_out(&self) -> Result<()> {
        let _guard = self.lock.lock();
        self.gate
            .invalidate_with(|| self.vault.clear())
            .map_err(|e| {
                warn!(error = %e, "failed to clear stored credentials");
                e
            })?;
        info!("signed out");
        Ok(())
    }

    /// Whether an account is stored.
    pub fn is_signed_in(&self) -> bool {
        self.vault.has_credentials()
    }

    /// Whether a protected action must prompt for the password.
    pub fn needs_password(&self) -> bool {
        self.gate.should_reauthenticate()
    }

    /// Where the session stands right now.
    pub fn state(&self) -> AuthState {
        if self.locked_out.load(Ordering::SeqCst) {
            AuthState::LockedOut
        } else if self.gate.should_reauthenticate() {
            AuthState::Challenging
        } else {
            AuthState::Trusted
        }
    }

    /// Start a password challenge with a fresh attempt counter.
    pub fn challenge(&self) -> Challenge<'_> {
        Challenge::new(self)
    }

    pub(crate) fn lock_out(&self) {
        self.locked_out.store(true, Ordering::SeqCst);
        if let Err(e) = self.sign_out() {
            warn!(error = %e, "forced sign-out after lockout did not complete");
        }
    }
}
