use async_std::task;
use federated_session::{
    MemoryStore, SessionIssuer, SessionRecord, SessionStore, SessionValidator,
};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::time::Duration;

const ISSUANCES: usize = 10_000;

/// Concurrent issuances never hand out the same token twice.
#[async_std::test]
async fn test_concurrent_issuances_are_unique() {
    let store: SessionStore<Value, _> = SessionStore::new(MemoryStore::new());
    let issuer = SessionIssuer::new(store.clone());
    let validator = SessionValidator::new(store);

    let handles: Vec<_> = (0..ISSUANCES)
        .map(|i| {
            let issuer = issuer.clone();
            task::spawn(async move { issuer.issue(json!({ "id": i })).await.unwrap() })
        })
        .collect();

    let mut tokens = HashSet::with_capacity(ISSUANCES);
    for handle in handles {
        tokens.insert(handle.await);
    }
    assert_eq!(tokens.len(), ISSUANCES);

    for token in tokens.iter().take(100) {
        assert!(validator.validate_token(token).await.is_valid());
    }
}

/// Every request that issues a session and validates it right away sees it as valid,
/// no matter how many other requests run at the same time.
#[async_std::test]
async fn test_read_your_writes() {
    let store: SessionStore<Value, _> = SessionStore::new(MemoryStore::new());
    let issuer = SessionIssuer::new(store.clone());
    let validator = SessionValidator::new(store);

    let handles: Vec<_> = (0..500)
        .map(|i| {
            let issuer = issuer.clone();
            let validator = validator.clone();
            task::spawn(async move {
                let token = issuer.issue(json!({ "id": i })).await.unwrap();
                validator.validate_token(&token).await.into_profile()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.await, Some(json!({ "id": i })));
    }
}

/// Concurrent writes to the same id resolve to one of the written records, never a mix.
#[async_std::test]
async fn test_concurrent_puts_to_same_id() {
    let store: SessionStore<Value, _> = SessionStore::new(MemoryStore::new());
    let id = federated_session::DebugSessionTokenGenerator::token_at(0).session_id();

    let writers: Vec<_> = (0..200)
        .map(|i| {
            let store = store.clone();
            let id = id.clone();
            task::spawn(async move {
                let record =
                    SessionRecord::new(id.clone(), json!({ "n": i, "copy": i }), store.now());
                store.put(&id, record, Duration::ZERO).await.unwrap();
            })
        })
        .collect();
    let readers: Vec<_> = (0..200)
        .map(|_| {
            let store = store.clone();
            let id = id.clone();
            task::spawn(async move { store.get(&id).await.unwrap() })
        })
        .collect();

    for reader in readers {
        if let Some(record) = reader.await {
            assert_eq!(record.profile["n"], record.profile["copy"]);
        }
    }
    for writer in writers {
        writer.await;
    }

    let record = store.get(&id).await.unwrap().unwrap();
    assert_eq!(record.profile["n"], record.profile["copy"]);
    assert_eq!(record.id, id);
}
