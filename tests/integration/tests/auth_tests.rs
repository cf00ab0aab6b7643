//! Token lifecycle tests against a loopback HTTP backend
//!
//! These run the real reqwest transport end to end: bearer attachment,
//! the 401 refresh-and-retry path, and refresh single-flight reuse.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use integration_tests::helpers::TestBackend;
use parlor_client::{
    Api, ApiError, AuthClient, ClientConfig, HttpApi, HttpMethod, InMemoryTokenStore, TokenPair,
    TokenStore,
};

fn tokens(access: &str, refresh: &str) -> TokenPair {
    TokenPair {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
    }
}

async fn seeded_store() -> Arc<InMemoryTokenStore> {
    let store = Arc::new(InMemoryTokenStore::default());
    store.save(tokens("stale", "r1")).await;
    store
}

fn stack(backend: &TestBackend, store: Arc<InMemoryTokenStore>) -> (Arc<AuthClient>, HttpApi) {
    let http = reqwest::Client::new();
    let auth = Arc::new(AuthClient::new(
        http.clone(),
        backend.base_url.clone(),
        store,
    ));
    let api = HttpApi::new(http, backend.base_url.clone(), Arc::clone(&auth));
    (auth, api)
}

#[tokio::test]
async fn test_expired_token_is_refreshed_and_the_request_retried() {
    let data_hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&data_hits);
    let backend = TestBackend::start(Arc::new(move |_method, path| match path {
        "/auth/refresh" => (
            200,
            r#"{"access_token":"fresh","refresh_token":"r2"}"#.to_string(),
        ),
        "/data" => {
            // First hit carries the stale token, second the fresh one
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                (401, "{}".to_string())
            } else {
                (200, r#"{"ok":true}"#.to_string())
            }
        }
        _ => (404, "{}".to_string()),
    }))
    .await;

    let store = seeded_store().await;
    let (_auth, api) = stack(&backend, Arc::clone(&store));

    let payload = api.request(HttpMethod::Get, "/data", None).await.unwrap();
    assert_eq!(payload.unwrap()["ok"], true);

    assert_eq!(backend.hit_count("/auth/refresh"), 1);
    assert_eq!(backend.hit_count("/data"), 2);
    assert_eq!(store.load().await.unwrap().access_token, "fresh");
}

#[tokio::test]
async fn test_failed_refresh_ends_the_session() {
    let backend = TestBackend::start(Arc::new(|_method, path| match path {
        "/auth/refresh" => (401, "{}".to_string()),
        _ => (401, "{}".to_string()),
    }))
    .await;

    let store = seeded_store().await;
    let (_auth, api) = stack(&backend, Arc::clone(&store));

    let result = api.request(HttpMethod::Get, "/data", None).await;
    assert!(matches!(result, Err(ApiError::SessionExpired)));
    assert!(store.load().await.is_none());
}

#[tokio::test]
async fn test_refresh_is_single_flight() {
    let backend = TestBackend::start(Arc::new(|_method, path| match path {
        "/auth/refresh" => (
            200,
            r#"{"access_token":"fresh","refresh_token":"r2"}"#.to_string(),
        ),
        _ => (404, "{}".to_string()),
    }))
    .await;

    let store = seeded_store().await;
    let (auth, _api) = stack(&backend, store);

    // Both callers saw a 401 on the same stale token; the second must reuse
    // the first one's result instead of spending the refresh token again
    let first = auth.refresh("stale").await.unwrap();
    let second = auth.refresh("stale").await.unwrap();

    assert_eq!(first, "fresh");
    assert_eq!(second, "fresh");
    assert_eq!(backend.hit_count("/auth/refresh"), 1);
}

#[tokio::test]
async fn test_request_without_tokens_is_rejected_locally() {
    let backend = TestBackend::start(Arc::new(|_method, _path| (200, "{}".to_string()))).await;
    let store = Arc::new(InMemoryTokenStore::default());
    let (_auth, api) = stack(&backend, store);

    let result = api.request(HttpMethod::Get, "/data", None).await;
    assert!(matches!(result, Err(ApiError::NotSignedIn)));
    assert_eq!(backend.hits().len(), 0);
}

#[tokio::test]
async fn test_config_built_stack_serves_requests() {
    let backend = TestBackend::start(Arc::new(|_method, path| match path {
        "/data" => (200, r#"{"ok":true}"#.to_string()),
        _ => (404, "{}".to_string()),
    }))
    .await;

    let config = ClientConfig {
        api_base_url: backend.base_url.clone(),
        request_timeout_secs: 5,
        ..ClientConfig::default()
    };
    let store = seeded_store().await;
    let auth = Arc::new(AuthClient::from_config(&config, store).unwrap());
    let api = HttpApi::from_config(&config, auth).unwrap();

    let payload = api.request(HttpMethod::Get, "/data", None).await.unwrap();
    assert_eq!(payload.unwrap()["ok"], true);
}

#[tokio::test]
async fn test_sign_in_stores_the_issued_tokens() {
    let backend = TestBackend::start(Arc::new(|method, path| {
        if method == "POST" && path == "/auth/login" {
            (
                200,
                r#"{"access_token":"a1","refresh_token":"r1"}"#.to_string(),
            )
        } else {
            (404, "{}".to_string())
        }
    }))
    .await;

    let store = Arc::new(InMemoryTokenStore::default());
    let (auth, _api) = stack(&backend, Arc::clone(&store));

    let issued = auth
        .sign_in(&parlor_client::SignInRequest {
            message: "parlor wants you to sign in".to_string(),
            signature: "0xsig".to_string(),
            address: "0xaaa".to_string(),
            signed_at: chrono::Utc::now(),
            nonce: "n1".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(issued.access_token, "a1");
    assert_eq!(store.load().await.unwrap().refresh_token, "r1");
}
