use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use serde_json::{Value, json};
use sso::{
    api,
    auth::{Auth, AuthService, Error, HashParams, PasswordHasher, TokenIssuer},
    storage::MemoryStorage,
};
use std::{sync::Arc, time::Duration};
use tower::ServiceExt;

const APP_ID: i64 = 1;
const APP_SECRET: &[u8] = b"test-secret";
const TTL: Duration = Duration::from_secs(3600);

struct TestApp {
    router: Router,
    storage: MemoryStorage,
}

async fn test_app() -> TestApp {
    let storage = MemoryStorage::new();
    storage.insert_app(APP_ID, "test", APP_SECRET).await;

    let hasher = PasswordHasher::new(HashParams {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    })
    .expect("hasher");

    let auth: Arc<dyn Auth> = Arc::new(AuthService::new(
        storage.clone(),
        storage.clone(),
        storage.clone(),
        hasher,
        TokenIssuer::new(),
        TTL,
    ));

    TestApp {
        router: api::app(auth, Duration::from_secs(10)),
        storage,
    }
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<String>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(body.map_or_else(Body::empty, Body::from))
        .expect("request");

    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

async fn post(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(router, "POST", uri, Some(body.to_string())).await
}

async fn register(router: &Router, email: &str, password: &str) -> i64 {
    let (status, body) = post(
        router,
        "/register",
        json!({"email": email, "password": password}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["user_id"].as_i64().expect("user_id")
}

#[tokio::test]
async fn register_then_login() {
    let app = test_app().await;
    let user_id = register(&app.router, "alice@example.com", "s3cret").await;
    assert!(user_id > 0);

    let (status, body) = post(
        &app.router,
        "/login",
        json!({"email": "alice@example.com", "password": "s3cret", "app_id": APP_ID}),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let token = body["token"].as_str().expect("token");
    let parsed = TokenIssuer::new().parse(token, APP_ID, APP_SECRET);
    assert_eq!(parsed.ok(), Some(user_id));
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() {
    let app = test_app().await;
    register(&app.router, "alice@example.com", "s3cret").await;

    let wrong_password = post(
        &app.router,
        "/login",
        json!({"email": "alice@example.com", "password": "nope", "app_id": APP_ID}),
    )
    .await;
    let unknown_email = post(
        &app.router,
        "/login",
        json!({"email": "bob@example.com", "password": "s3cret", "app_id": APP_ID}),
    )
    .await;

    assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password, unknown_email);
    assert_eq!(
        wrong_password.1,
        json!({"error": "invalid email or password"})
    );
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = test_app().await;
    register(&app.router, "alice@example.com", "s3cret").await;

    let (status, body) = post(
        &app.router,
        "/register",
        json!({"email": "alice@example.com", "password": "other"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({"error": "user already exists"}));
    assert_eq!(app.storage.user_count().await, 1);
}

#[tokio::test]
async fn missing_fields_are_rejected() {
    let app = test_app().await;

    let cases = [
        ("/register", json!({"password": "pw"}), "email is required"),
        ("/register", json!({"email": "a@example.com"}), "password is required"),
        ("/register", json!({"email": "nope", "password": "pw"}), "invalid email"),
        ("/login", json!({"password": "pw", "app_id": 1}), "email is required"),
        ("/login", json!({"email": "a@example.com", "app_id": 1}), "password is required"),
        ("/login", json!({"email": "a@example.com", "password": "pw"}), "app_id is required"),
        ("/is_admin", json!({}), "user_id is required"),
    ];

    for (uri, body, message) in cases {
        let (status, response) = post(&app.router, uri, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri} {message}");
        assert_eq!(response, json!({"error": message}));
    }
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let app = test_app().await;

    let (status, body) = send(&app.router, "POST", "/login", Some("{not json".to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "invalid json"}));

    let (status, body) = post(
        &app.router,
        "/register",
        json!({"email": "a@example.com", "password": "pw", "admin": true}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "invalid json"}));
}

#[tokio::test]
async fn unknown_app_is_a_bad_request() {
    let app = test_app().await;
    register(&app.router, "alice@example.com", "s3cret").await;

    let (status, body) = post(
        &app.router,
        "/login",
        json!({"email": "alice@example.com", "password": "s3cret", "app_id": 42}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "invalid app_id"}));
}

#[tokio::test]
async fn is_admin_reports_flag() {
    let app = test_app().await;
    let alice = register(&app.router, "alice@example.com", "s3cret").await;
    let bob = register(&app.router, "bob@example.com", "s3cret").await;
    app.storage.set_admin(alice, true).await.expect("set admin");

    let (status, body) = post(&app.router, "/is_admin", json!({"user_id": alice})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"is_admin": true}));

    let (status, body) = post(&app.router, "/is_admin", json!({"user_id": bob})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"is_admin": false}));

    let (status, body) = post(&app.router, "/is_admin", json!({"user_id": 9999})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "user not found"}));
}

#[tokio::test]
async fn health_reports_build_info() {
    let app = test_app().await;

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("request");
    let response = app.router.clone().oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let x_app = response
        .headers()
        .get("X-App")
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    assert!(x_app.is_some_and(|v| v.starts_with("sso:")));

    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body: Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(body["name"], "sso");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn request_id_is_propagated() {
    let app = test_app().await;

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .expect("request");
    let response = app.router.clone().oneshot(request).await.expect("response");

    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("req-123")
    );
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = test_app().await;
    let (status, _) = send(&app.router, "GET", "/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// Every call outlasts the request timeout used below.
struct StalledAuth;

#[async_trait::async_trait]
impl Auth for StalledAuth {
    async fn login(&self, _email: &str, _password: &str, _app_id: i64) -> Result<String, Error> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok("late".to_string())
    }

    async fn register_new_user(&self, _email: &str, _password: &str) -> Result<i64, Error> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(1)
    }

    async fn is_admin(&self, _user_id: i64) -> Result<bool, Error> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(false)
    }
}

#[tokio::test]
async fn slow_requests_time_out_with_json_error() {
    let router = api::app(Arc::new(StalledAuth), Duration::from_millis(50));

    let (status, body) = post(
        &router,
        "/login",
        json!({"email": "alice@example.com", "password": "s3cret", "app_id": APP_ID}),
    )
    .await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body, json!({"error": "request timeout"}));

    let (status, body) = post(&router, "/is_admin", json!({"user_id": 7})).await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body, json!({"error": "request timeout"}));
}
