//! Interactive password challenges.

use tracing::{debug, warn};

use crate::authenticator::Authenticator;

/// Where a signed-in session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// Inside the trust window; protected actions proceed.
    Trusted,
    /// The trust window has lapsed; the user must re-enter the password.
    Challenging,
    /// Too many failed attempts; the account was signed out.
    LockedOut,
}

/// Result of one submitted password.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeOutcome {
    /// Password accepted; the trust window restarted.
    Verified,
    /// Wrong password; the user may try again.
    Rejected {
        /// Failed attempts so far in this challenge.
        attempt: u32,
        /// Further failures tolerated before lockout.
        remaining: u32,
    },
    /// Attempt cap exceeded; the account was signed out.
    LockedOut,
}

/// One password prompt session with its own attempt counter.
///
/// The counter belongs to the prompt, not the gate: a new challenge starts
/// from zero. Exceeding the gate's attempt cap signs the account out and
/// the challenge stays locked out from then on.
#[derive(Debug)]
pub struct Challenge<'a> {
    auth: &'a Authenticator,
    attempts: u32,
    locked_out: bool,
}

impl<'a> Challenge<'a> {
    pub(crate) fn new(auth: &'a Authenticator) -> Self {
        Self {
            auth,
            attempts: 0,
            locked_out: false,
        }
    }

    /// Failed attempts so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Whether this challenge has ended in lockout.
    pub fn is_locked_out(&self) -> bool {
        self.locked_out
    }

    /// Check a password entered by the user.
    pub fn submit(&mut self, candidate: &str) -> ChallengeOutcome {
        if self.locked_out {
            return ChallengeOutcome::LockedOut;
        }

        let gate = self.auth.gate();
        if gate.verify(candidate) {
            debug!(attempts = self.attempts, "challenge passed");
            return ChallengeOutcome::Verified;
        }

        self.attempts += 1;
        if gate.is_last_attempt(self.attempts) {
            warn!(attempts = self.attempts, "attempt cap exceeded, signing out");
            self.locked_out = true;
            self.auth.lock_out();
            return ChallengeOutcome::LockedOut;
        }

        let remaining = gate.policy().max_attempts.saturating_sub(self.attempts);
        debug!(attempt = self.attempts, remaining, "challenge attempt rejected");
        ChallengeOutcome::Rejected {
            attempt: self.attempts,
            remaining,
        }
    }
}
