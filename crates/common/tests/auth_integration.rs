//! Integration tests for auth module
//!
//! Tests token bootstrap, refresh and persistence through the public API with
//! a scripted transport and real/in-memory token stores.

use std::sync::{Arc, Once};
use std::time::Duration;

use adfin_common::auth::{
    BootstrapOutcome, CallbackTokenStore, ClientCredentials, FileTokenStore, OAuthClient,
    OAuthClientError, StoreError, TokenManager, TokenManagerError, TokenRecord, TokenStore,
};
use adfin_common::testing::{MemoryTokenStore, MockTransport};
use chrono::{TimeDelta, Utc};
use tempfile::TempDir;

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn credentials() -> ClientCredentials {
    ClientCredentials {
        client_id: Some("c".to_string()),
        client_secret: Some("s".to_string()),
        code: Some("x".to_string()),
        redirect_uri: Some("https://app.example.com/callback".to_string()),
    }
}

fn manager(transport: &Arc<MockTransport>, store: Arc<dyn TokenStore>) -> TokenManager {
    let client = OAuthClient::new(transport.clone(), "https://example.com", credentials());
    TokenManager::new(client, store)
}

/// Validates that tokens acquired by one manager are restored by the next.
///
/// # Test Steps
/// 1. Bootstrap a manager over an empty token file (code exchange)
/// 2. Bootstrap a second manager over the same file
/// 3. Verify the second manager restored an equal record without any network call
#[tokio::test(flavor = "multi_thread")]
async fn test_file_store_survives_restart() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("adfin-tokens.json");

    let transport = Arc::new(MockTransport::new());
    transport.push_token("a1", "r1", 3600);
    let first = manager(&transport, Arc::new(FileTokenStore::new(&path)));
    assert_eq!(first.initialize().await.unwrap(), BootstrapOutcome::Acquired);
    let acquired = first.tokens().await.unwrap();

    let idle = Arc::new(MockTransport::new());
    let second = manager(&idle, Arc::new(FileTokenStore::new(&path)));
    assert_eq!(second.initialize().await.unwrap(), BootstrapOutcome::Restored);

    assert_eq!(second.tokens().await, Some(acquired));
    assert_eq!(second.ensure_valid_token().await.unwrap(), "a1");
    assert_eq!(idle.call_count(), 0);
}

/// Validates the persisted expiry matches issue time + expires_in - 60s.
///
/// # Test Steps
/// 1. Record the time before and after a code exchange returning 3600s
/// 2. Verify the stored expiry lies within that window shifted by 3540s
#[tokio::test(flavor = "multi_thread")]
async fn test_expiry_includes_safety_buffer() {
    let transport = Arc::new(MockTransport::new());
    transport.push_token("a1", "r1", 3600);
    let store = Arc::new(MemoryTokenStore::new());
    let manager = manager(&transport, store.clone());

    let before = Utc::now();
    manager.initialize().await.unwrap();
    let after = Utc::now();

    let expires_at = store.last_saved().unwrap().expires_at;
    let lifetime = TimeDelta::seconds(3540);
    assert!(expires_at >= before + lifetime - TimeDelta::milliseconds(1));
    assert!(expires_at <= after + lifetime);
}

/// Validates that a malformed token file is treated as "nothing stored".
///
/// # Test Steps
/// 1. Write garbage to the token file
/// 2. Bootstrap: exactly one code exchange happens
/// 3. Verify the file now holds the new record
#[tokio::test(flavor = "multi_thread")]
async fn test_malformed_token_file_falls_back_to_code_exchange() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("adfin-tokens.json");
    std::fs::write(&path, "not json at all").unwrap();

    let transport = Arc::new(MockTransport::new());
    transport.push_token("a1", "r1", 3600);
    let store = FileTokenStore::new(&path);
    let manager = manager(&transport, Arc::new(store.clone()));

    assert_eq!(manager.initialize().await.unwrap(), BootstrapOutcome::Acquired);
    assert_eq!(transport.call_count(), 1);
    assert_eq!(store.load().await.unwrap().unwrap().access_token, "a1");
}

/// Validates caller-supplied load/save closures drive bootstrap and refresh.
///
/// # Test Steps
/// 1. Load closure returns an expired record
/// 2. First `ensure_valid_token` refreshes once
/// 3. Save closure receives the refreshed record
#[tokio::test(flavor = "multi_thread")]
async fn test_callback_store_receives_refreshed_tokens() {
    let saved = Arc::new(tokio::sync::Mutex::new(None::<TokenRecord>));
    let sink = saved.clone();
    let expired = TokenRecord::new("a", "b", Utc::now() - TimeDelta::hours(1));

    let store = CallbackTokenStore::new()
        .with_load(move || {
            let expired = expired.clone();
            async move { Ok::<_, StoreError>(Some(expired)) }
        })
        .with_save(move |record| {
            let sink = sink.clone();
            async move {
                *sink.lock().await = Some(record);
                Ok::<_, StoreError>(())
            }
        });

    let transport = Arc::new(MockTransport::new());
    transport.push_token("a2", "r2", 3600);
    let manager = manager(&transport, Arc::new(store));

    assert_eq!(manager.ensure_valid_token().await.unwrap(), "a2");
    assert_eq!(transport.call_count(), 1);
    assert_eq!(saved.lock().await.as_ref().map(|r| r.refresh_token.clone()), Some("r2".into()));
}

/// Validates that a failing save surfaces from the code exchange.
///
/// # Test Steps
/// 1. Save closure always fails
/// 2. `initialize` returns a storage error
/// 3. The acquired token is still usable in memory
#[tokio::test(flavor = "multi_thread")]
async fn test_save_failure_surfaces_from_bootstrap() {
    let store = CallbackTokenStore::new()
        .with_save(|_| async { Err::<(), _>(StoreError::Backend("read-only volume".into())) });

    let transport = Arc::new(MockTransport::new());
    transport.push_token("a1", "r1", 3600);
    let manager = manager(&transport, Arc::new(store));

    let err = manager.initialize().await.unwrap_err();
    assert!(matches!(err, TokenManagerError::Storage(_)));
    assert_eq!(manager.bootstrap_outcome(), Some(BootstrapOutcome::Acquired));
    assert_eq!(manager.ensure_valid_token().await.unwrap(), "a1");
}

/// Validates single-flight refresh under real parallelism.
///
/// # Test Steps
/// 1. Restore an expired record
/// 2. Spawn eight tasks calling `ensure_valid_token` on a multi-threaded runtime
/// 3. Verify one refresh request and every task got the new token
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_callers_refresh_once() {
    let transport = Arc::new(MockTransport::new());
    transport.set_delay(Duration::from_millis(50));
    transport.push_token("a2", "r2", 3600);
    let store = Arc::new(MemoryTokenStore::with_record(TokenRecord::new(
        "a",
        "b",
        Utc::now() - TimeDelta::seconds(1),
    )));
    let manager = Arc::new(manager(&transport, store));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let manager = manager.clone();
            tokio::spawn(async move { manager.ensure_valid_token().await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), "a2");
    }
    assert_eq!(transport.call_count(), 1);
}

/// Validates the 10-second token endpoint deadline.
///
/// # Test Steps
/// 1. Transport answers after 11 seconds (paused clock)
/// 2. Verify the exchange fails with a timeout wrapped as an acquisition error
#[tokio::test(start_paused = true)]
async fn test_token_request_times_out() {
    let transport = Arc::new(MockTransport::new());
    transport.set_delay(Duration::from_secs(11));
    transport.push_token("a1", "r1", 3600);
    let manager = manager(&transport, Arc::new(MemoryTokenStore::new()));

    let err = manager.initialize().await.unwrap_err();
    assert!(matches!(
        err,
        TokenManagerError::AcquisitionFailed(OAuthClientError::Timeout(d)) if d == Duration::from_secs(10)
    ));
    assert!(!manager.is_authenticated().await);
}
