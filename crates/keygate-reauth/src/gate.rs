//! The re-authentication gate.
//!
//! Holds the process-wide trust window: when the user last proved who they
//! are, and how long that proof stays good. Protected actions ask
//! [`ReAuthenticationGate::should_reauthenticate`] before proceeding and, when
//! it says yes, feed re-entered passwords to
//! [`ReAuthenticationGate::verify`].
//!
//! Attempt counting is not done here. The gate only answers
//! [`ReAuthenticationGate::is_last_attempt`] for a counter owned by the
//! caller's challenge (see [`crate::Challenge`]).

use std::sync::Arc;
use std::time::{Duration, Instant};

use keygate_core::config::{SessionConfig, DEFAULT_MAX_ATTEMPTS, DEFAULT_SESSION_TIMEOUT_SECS};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::clock::{Clock, MonotonicClock};
use crate::vault::AccountVault;

/// Timing and attempt limits for re-authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    /// How long a successful authentication stays trusted.
    pub session_timeout: Duration,
    /// Failed attempts tolerated per challenge.
    pub max_attempts: u32,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            session_timeout: Duration::from_secs(DEFAULT_SESSION_TIMEOUT_SECS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl From<&SessionConfig> for SessionPolicy {
    fn from(config: &SessionConfig) -> Self {
        Self {
            session_timeout: config.timeout(),
            max_attempts: config.max_attempts,
        }
    }
}

/// In-memory session state. Never persisted.
#[derive(Debug, Default)]
struct SessionState {
    last_authenticated_at: Option<Instant>,
}

/// Decides whether a protected action needs the user to re-enter their
/// password, and checks the password when it does.
#[derive(Debug)]
pub struct ReAuthenticationGate {
    vault: AccountVault,
    policy: SessionPolicy,
    clock: Arc<dyn Clock>,
    state: Mutex<SessionState>,
}

impl ReAuthenticationGate {
    /// Gate over the account stored in `vault`, using the monotonic clock.
    pub fn new(vault: AccountVault, policy: SessionPolicy) -> Self {
        Self::with_clock(vault, policy, Arc::new(MonotonicClock))
    }

    /// Gate with an explicit clock.
    pub fn with_clock(vault: AccountVault, policy: SessionPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            vault,
            policy,
            clock,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Timing and attempt limits in force.
    pub fn policy(&self) -> SessionPolicy {
        self.policy
    }

    /// The account this gate verifies against.
    pub fn vault(&self) -> &AccountVault {
        &self.vault
    }

    /// `true` when there is no recorded authentication or the last one is
    /// at least `session_timeout` old.
    pub fn should_reauthenticate(&self) -> bool {
        let state = self.state.lock();
        self.trust_left(&state).is_none()
    }

    /// Time left in the current trust window, `None` when not trusted.
    pub fn remaining_trust(&self) -> Option<Duration> {
        let state = self.state.lock();
        self.trust_left(&state)
    }

    /// Check `candidate` against the stored password of the current account.
    ///
    /// A match restarts the trust window. A mismatch, a missing account and
    /// a store failure all return `false` and leave the window alone.
    pub fn verify(&self, candidate: &str) -> bool {
        let mut state = self.state.lock();

        let Some(user_id) = self.vault.user_id() else {
            debug!("verification failed: no stored account");
            return false;
        };
        let Some(password) = self.vault.password_for(&user_id) else {
            debug!("verification failed: no stored password");
            return false;
        };
        if !password.matches(candidate) {
            debug!("verification failed: password mismatch");
            return false;
        }

        state.last_authenticated_at = Some(self.clock.now());
        debug!("verification succeeded, trust window restarted");
        true
    }

    /// Start a new trust window now.
    pub fn update_last_auth_time(&self) {
        self.state.lock().last_authenticated_at = Some(self.clock.now());
    }

    /// End the trust window. The next check requires re-authentication.
    pub fn invalidate(&self) {
        end_window(&mut self.state.lock());
    }

    /// Run `clear` and end the trust window as one step.
    ///
    /// The session lock is held across both, so a [`verify`](Self::verify)
    /// racing with `clear` either finishes before it starts or sees its
    /// result. The window ends even when `clear` fails.
    pub fn invalidate_with<T, E>(&self, clear: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        let mut state = self.state.lock();
        let result = clear();
        end_window(&mut state);
        result
    }

    /// Whether the `attempt`-th failed try exceeds the cap.
    pub fn is_last_attempt(&self, attempt: u32) -> bool {
        attempt > self.policy.max_attempts
    }

    fn trust_left(&self, state: &SessionState) -> Option<Duration> {
        let since = state.last_authenticated_at?;
        let elapsed = self.clock.now().saturating_duration_since(since);
        self.policy
            .session_timeout
            .checked_sub(elapsed)
            .filter(|left| !left.is_zero())
    }
}

fn end_window(state: &mut SessionState) {
    if state.last_authenticated_at.take().is_some() {
        info!("session invalidated");
    }
}
