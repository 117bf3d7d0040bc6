//! Tests for the bearer-auth middleware and error mapping.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use amsterdam_client::{AmsterdamClient, ApiError, ClientConfig, UnauthorizedEvent};
use credential_store::{CredentialStore, MemoryCredentialStore};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn build_client(
    server_uri: &str,
    store: Arc<MemoryCredentialStore>,
    unauthorized_tx: Option<UnboundedSender<UnauthorizedEvent>>,
) -> AmsterdamClient {
    let config = ClientConfig::with_api_base(format!("{server_uri}/api"));
    AmsterdamClient::new(&config, store as Arc<dyn CredentialStore>, unauthorized_tx)
        .expect("client")
}

fn user_json(id: i64, email: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "email": email,
        "first_name": "Test",
        "last_name": "User",
        "age": 30,
        "is_admin": false,
        "profile_picture": null,
        "email_verified": true
    })
}

/// A stored token is attached as `Authorization: Bearer <token>`.
#[tokio::test]
async fn test_bearer_header_attached_when_token_present() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/profile"))
        .and(header("authorization", "Bearer tok1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"user": user_json(1, "a@b.com")})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    store.save("tok1").await.unwrap();
    let client = build_client(&mock_server.uri(), store, None);

    let user = client.profile().await.expect("profile");
    assert_eq!(user.id, 1);
    assert_eq!(user.email, "a@b.com");
    assert_eq!(user.user_age, Some(30));
}

/// With an empty store, no Authorization header goes out at all.
#[tokio::test]
async fn test_no_bearer_header_without_token() {
    let mock_server = MockServer::start().await;

    Mock::given(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/content/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "facts": [{"title": "Canal Ring", "content": "UNESCO site since 2010."}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let client = build_client(&mock_server.uri(), store, None);

    let content = client.history_content().await.expect("content");
    assert_eq!(content.facts.len(), 1);
    assert_eq!(content.facts[0].title, "Canal Ring");
}

/// A 401 response sends exactly one event on the unauthorized channel and
/// surfaces as `ApiError::Unauthorized` with the payload's message.
#[tokio::test]
async fn test_unauthorized_signaled_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/profile"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({"error": "Token has expired"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    store.save("stale").await.unwrap();
    let (tx, mut rx) = unbounded_channel();
    let client = build_client(&mock_server.uri(), store, Some(tx));

    let error = client.profile().await.expect_err("should be rejected");
    assert!(error.is_unauthorized());
    assert_eq!(error.api_message(), Some("Token has expired"));

    assert_eq!(rx.try_recv().ok(), Some(UnauthorizedEvent));
    assert!(rx.try_recv().is_err(), "only one event per 401");
}

/// The middleware itself never touches the store; reconciling after a 401
/// belongs to the session layer.
#[tokio::test]
async fn test_middleware_does_not_clear_store_on_401() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/profile"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    store.save("stale").await.unwrap();
    let client = build_client(&mock_server.uri(), Arc::clone(&store), None);

    let _ = client.profile().await;
    assert_eq!(store.load().await.as_deref(), Some("stale"));
}

/// The API's `{"error": ...}` message is extracted from failure payloads.
#[tokio::test]
async fn test_error_message_extracted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/calculator"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(serde_json::json!({"error": "Cannot divide by zero"})),
        )
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    store.save("tok1").await.unwrap();
    let client = build_client(&mock_server.uri(), store, None);

    let error = client
        .calculate(1.0, 0.0, amsterdam_client::models::Operation::Divide)
        .await
        .expect_err("division by zero");

    assert_eq!(error.api_message(), Some("Cannot divide by zero"));
    match error {
        ApiError::Api { status, .. } => assert_eq!(status.as_u16(), 400),
        other => panic!("unexpected error: {other:?}"),
    }
}

/// A failure body that is not the expected JSON yields no message; callers
/// fall back to their own generic text.
#[tokio::test]
async fn test_malformed_error_body_has_no_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/calculator/history"))
        .respond_with(ResponseTemplate::new(400).set_body_string("<html>bad request</html>"))
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let client = build_client(&mock_server.uri(), store, None);

    let error = client.calculation_history().await.expect_err("bad request");
    assert_eq!(error.api_message(), None);
}

/// Transient 5xx responses are retried by the middleware stack.
#[tokio::test]
async fn test_retry_on_server_error() {
    let mock_server = MockServer::start().await;
    let request_count = Arc::new(AtomicUsize::new(0));
    let counter = request_count.clone();

    // Fails twice then succeeds
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(move |_req: &wiremock::Request| {
            let count = counter.fetch_add(1, Ordering::SeqCst);
            if count < 2 {
                ResponseTemplate::new(503).set_body_string("Service Unavailable")
            } else {
                ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "status": "healthy",
                    "message": "Amsterdam API is running!"
                }))
            }
        })
        .expect(3)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let client = build_client(&mock_server.uri(), store, None);

    let health = client.health().await.expect("should succeed after retries");
    assert_eq!(health.status, "healthy");
    assert_eq!(request_count.load(Ordering::SeqCst), 3);
}

/// 4xx responses are client errors and must not be retried.
#[tokio::test]
async fn test_no_retry_on_client_error() {
    let mock_server = MockServer::start().await;
    let request_count = Arc::new(AtomicUsize::new(0));
    let counter = request_count.clone();

    Mock::given(method("GET"))
        .and(path("/api/admin/stats"))
        .respond_with(move |_req: &wiremock::Request| {
            counter.fetch_add(1, Ordering::SeqCst);
            ResponseTemplate::new(403)
                .set_body_json(serde_json::json!({"error": "Admin access required"}))
        })
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let client = build_client(&mock_server.uri(), store, None);

    let error = client.admin_stats().await.expect_err("forbidden");
    assert_eq!(error.api_message(), Some("Admin access required"));
    assert_eq!(request_count.load(Ordering::SeqCst), 1);
}

/// Login sends the credential payload and decodes the token plus profile.
#[tokio::test]
async fn test_login_round_trip() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(
            serde_json::json!({"email": "a@b.com", "password": "secret"}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "Login successful",
            "access_token": "tok1",
            "user": {
                "id": 1,
                "email": "a@b.com",
                "first_name": "Test",
                "last_name": "User",
                "is_admin": false,
                "user_age": 30
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let client = build_client(&mock_server.uri(), store, None);

    let request = amsterdam_client::models::LoginRequest {
        email: "a@b.com".to_string(),
        password: "secret".to_string(),
    };
    let response = client.login(&request).await.expect("login");

    assert_eq!(response.access_token, "tok1");
    assert_eq!(response.user.id, 1);
    assert_eq!(response.user.user_age, Some(30));
}

/// The OAuth entry point is a plain URL under the API base.
#[tokio::test]
async fn test_google_auth_url() {
    let store = Arc::new(MemoryCredentialStore::new());
    let client = build_client("http://localhost:5001", store, None);

    assert_eq!(
        client.google_auth_url(),
        "http://localhost:5001/api/auth/google"
    );
}
