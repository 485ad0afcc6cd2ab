//! # keygate-reauth
//!
//! Session re-authentication for Keygate.
//!
//! - [`ReAuthenticationGate`]: the process-wide trust window and password
//!   verification against the stored account
//! - [`AccountVault`]: the signed-in account's credentials in a
//!   [`keygate_secrets::SecretStore`]
//! - [`Authenticator`] and [`Challenge`]: sign-in, sign-out and the
//!   bounded-retry password prompt built on the two above
//!
//! Time is measured with a monotonic [`Clock`].

pub mod authenticator;
pub mod challenge;
pub mod clock;
pub mod gate;
pub mod vault;

pub use authenticator::Authenticator;
pub use challenge::{AuthState, Challenge, ChallengeOutcome};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use gate::{ReAuthenticationGate, SessionPolicy};
pub use vault::{AccountVault, USER_ID_KEY};
