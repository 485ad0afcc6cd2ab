//! End-to-end sign-in, re-authentication and lockout flows.

use std::time::Duration;

use keygate_integration_tests::{held_wipe_authenticator, init_tracing, manual_authenticator};
use keygate_reauth::{AuthState, ChallengeOutcome, SessionPolicy};

#[test]
fn test_session_lifecycle() {
    init_tracing();
    let (auth, clock) = manual_authenticator(SessionPolicy::default());

    auth.complete_sign_in("alice", "hunter2").unwrap();
    assert_eq!(auth.state(), AuthState::Trusted);

    clock.advance(Duration::from_secs(1799));
    assert!(!auth.needs_password());

    clock.advance(Duration::from_secs(1));
    assert_eq!(auth.state(), AuthState::Challenging);

    let mut challenge = auth.challenge();
    assert!(matches!(
        challenge.submit("hunter3"),
        ChallengeOutcome::Rejected { attempt: 1, .. }
    ));
    assert_eq!(challenge.submit("hunter2"), ChallengeOutcome::Verified);
    assert_eq!(auth.state(), AuthState::Trusted);
    assert_eq!(
        auth.gate().remaining_trust(),
        Some(Duration::from_secs(1800))
    );
}

#[test]
fn test_failed_recheck_while_trusted_keeps_window() {
    let (auth, clock) = manual_authenticator(SessionPolicy::default());
    auth.complete_sign_in("alice", "hunter2").unwrap();
    clock.advance(Duration::from_secs(300));

    assert!(!auth.gate().verify("wrong"));
    assert_eq!(auth.state(), AuthState::Trusted);
    assert_eq!(
        auth.gate().remaining_trust(),
        Some(Duration::from_secs(1500))
    );
}

#[test]
fn test_lockout_signs_out() {
    let (auth, clock) = manual_authenticator(SessionPolicy::default());
    auth.complete_sign_in("alice", "hunter2").unwrap();
    clock.advance(Duration::from_secs(3600));

    let mut challenge = auth.challenge();
    let outcomes: Vec<_> = (0..6).map(|_| challenge.submit("wrong")).collect();
    assert_eq!(
        &outcomes[..5],
        &[
            ChallengeOutcome::Rejected { attempt: 1, remaining: 4 },
            ChallengeOutcome::Rejected { attempt: 2, remaining: 3 },
            ChallengeOutcome::Rejected { attempt: 3, remaining: 2 },
            ChallengeOutcome::Rejected { attempt: 4, remaining: 1 },
            ChallengeOutcome::Rejected { attempt: 5, remaining: 0 },
        ]
    );
    assert_eq!(outcomes[5], ChallengeOutcome::LockedOut);

    assert_eq!(auth.state(), AuthState::LockedOut);
    assert!(!auth.is_signed_in());
    assert_eq!(auth.vault().user_id(), None);
    assert!(auth.gate().should_reauthenticate());

    // A fresh sign-in restarts the state machine.
    auth.complete_sign_in("alice", "hunter2").unwrap();
    assert_eq!(auth.state(), AuthState::Trusted);
}

#[test]
fn test_custom_attempt_cap() {
    let (auth, clock) = manual_authenticator(SessionPolicy {
        session_timeout: Duration::from_secs(60),
        max_attempts: 1,
    });
    auth.complete_sign_in("alice", "hunter2").unwrap();
    clock.advance(Duration::from_secs(60));

    let mut challenge = auth.challenge();
    assert_eq!(
        challenge.submit("wrong"),
        ChallengeOutcome::Rejected { attempt: 1, remaining: 0 }
    );
    assert_eq!(challenge.submit("wrong"), ChallengeOutcome::LockedOut);
}

#[test]
fn test_sign_out_during_trust() {
    let (auth, _) = manual_authenticator(SessionPolicy::default());
    auth.complete_sign_in("alice", "hunter2").unwrap();

    auth.sign_out().unwrap();
    assert_eq!(auth.state(), AuthState::Challenging);
    assert!(!auth.gate().verify("hunter2"));
    assert!(!auth.is_signed_in());
}

#[test]
fn test_verify_during_sign_out_cannot_restore_trust() {
    let (auth, storage) = held_wipe_authenticator();
    auth.complete_sign_in("alice", "hunter2").unwrap();
    let (wiping, release) = storage.hold();

    std::thread::scope(|s| {
        let signing_out = s.spawn(|| auth.sign_out());
        wiping.recv().unwrap();

        // The wipe is paused with sign-out underway; verifiers started now
        // must not observe the account.
        let verifiers: Vec<_> = (0..4)
            .map(|_| s.spawn(|| auth.gate().verify("hunter2")))
            .collect();
        release.send(()).unwrap();

        signing_out.join().unwrap().unwrap();
        for verifier in verifiers {
            assert!(!verifier.join().unwrap());
        }
    });

    assert!(auth.gate().should_reauthenticate());
    assert_eq!(auth.state(), AuthState::Challenging);
    assert!(!auth.is_signed_in());
}
