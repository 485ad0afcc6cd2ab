//! Secret store contract tests against the in-memory backend.

use keygate_integration_tests::{init_tracing, memory_store};
use keygate_secrets::{AccessPolicy, AsyncSecretStore, Biometry, Namespace, SecretStore};

#[test]
fn test_round_trip_many_values() {
    init_tracing();
    let (store, _) = memory_store("com.example.contract");
    let policy = AccessPolicy::default();

    let cases: &[(&str, &[u8])] = &[
        ("token", b"abc"),
        ("empty", b""),
        ("binary", &[0, 159, 146, 150, 255]),
        ("unicode key \u{1F511}", "p\u{e4}ssw\u{f6}rd".as_bytes()),
    ];
    for (key, value) in cases {
        store.put(key, value, &policy).unwrap();
    }
    for (key, value) in cases {
        assert_eq!(store.get(key).unwrap().as_deref(), Some(*value), "key {key}");
    }
}

#[test]
fn test_second_put_is_an_update() {
    let (store, storage) = memory_store("com.example.contract");
    store
        .put_string("token", "v1", &AccessPolicy::biometric())
        .unwrap();
    store
        .put_string("token", "v2", &AccessPolicy::default())
        .unwrap();

    assert_eq!(store.get_string("token").unwrap().as_deref(), Some("v2"));
    let policy = storage.policy_of(store.namespace(), "token").unwrap();
    assert_eq!(policy.biometry, Some(Biometry::Any));
    assert_eq!(storage.keys(store.namespace()), vec!["token".to_string()]);
}

#[test]
fn test_has_follows_put_and_remove() {
    let (store, _) = memory_store("com.example.contract");
    assert!(!store.has("k"));
    store.put("k", b"v", &AccessPolicy::default()).unwrap();
    assert!(store.has("k"));
    store.remove("k").unwrap();
    assert!(!store.has("k"));
    store.remove("k").unwrap();
}

#[test]
fn test_remove_all_is_scoped() {
    let (store, storage) = memory_store("com.example.contract");
    let neighbour = store.scoped(Namespace::new("com.example.neighbour"));
    let grouped = store.scoped(Namespace::new("com.example.contract").with_access_group("team"));
    let policy = AccessPolicy::default();

    store.put("a", b"1", &policy).unwrap();
    store.put("b", b"2", &policy).unwrap();
    neighbour.put("a", b"3", &policy).unwrap();
    grouped.put("a", b"4", &policy).unwrap();

    store.remove_all().unwrap();
    assert_eq!(store.get("a").unwrap(), None);
    assert_eq!(store.get("b").unwrap(), None);
    assert!(storage.keys(store.namespace()).is_empty());
    assert_eq!(neighbour.get("a").unwrap().as_deref(), Some(&b"3"[..]));
    assert_eq!(grouped.get("a").unwrap().as_deref(), Some(&b"4"[..]));
}

#[test]
fn test_clones_share_state() {
    let (store, _) = memory_store("com.example.contract");
    let clone: SecretStore = store.clone();
    store.put_string("k", "v", &AccessPolicy::default()).unwrap();
    assert_eq!(clone.get_string("k").unwrap().as_deref(), Some("v"));
}

#[test]
fn test_concurrent_writers_leave_one_entry() {
    let (store, storage) = memory_store("com.example.contract");
    std::thread::scope(|s| {
        for i in 0..8 {
            let store = store.clone();
            s.spawn(move || {
                for round in 0..25 {
                    store
                        .put_string("shared", &format!("{i}-{round}"), &AccessPolicy::default())
                        .unwrap();
                }
            });
        }
    });
    assert_eq!(storage.keys(store.namespace()), vec!["shared".to_string()]);
    assert!(store.get_string("shared").unwrap().is_some());
}

#[tokio::test]
async fn test_async_store_matches_blocking_store() {
    let (store, _) = memory_store("com.example.contract");
    let async_store = AsyncSecretStore::new(store.clone());

    async_store
        .put_string("token", "abc".to_string(), AccessPolicy::default())
        .await
        .unwrap();
    assert_eq!(store.get_string("token").unwrap().as_deref(), Some("abc"));

    store.remove("token").unwrap();
    assert!(!async_store.has("token").await);
    assert_eq!(async_store.get("token").await.unwrap(), None);
    async_store.remove_all().await.unwrap();
}
