//! Integration tests: health, register variants, login, bearer-protected `me`.
//!
//! Run with `cargo test`. The in-memory store is used by default. The
//! PostgreSQL test additionally needs `TEST_DATABASE_URL` and is skipped
//! when it is unset.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use authdemo::auth::{password::AccountPolicy, JwtConfig, TokenIssuer};
use authdemo::repositories::{InMemoryRepository, UserRepository};
use authdemo::{create_app, db, AccountService, AppState, CredentialStore};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tower::util::ServiceExt;

fn jwt_config() -> JwtConfig {
    JwtConfig::from_parts(
        Some("test-jwt-secret-min-32-chars!!".to_string()),
        Some("authdemo".to_string()),
        Some("authdemo-clients".to_string()),
    )
    .unwrap()
}

fn app_with(repo: Arc<dyn UserRepository>) -> axum::Router {
    let store = CredentialStore::new(repo, AccountPolicy::default());
    let accounts = AccountService::new(store, TokenIssuer::new(jwt_config()));
    create_app(AppState::new(accounts))
}

fn app() -> axum::Router {
    app_with(Arc::new(InMemoryRepository::new()))
}

async fn post_json(app: &axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn get_me(app: &axum::Router, token: Option<&str>) -> (StatusCode, Value) {
    let mut req = Request::builder().uri("/api/account/me");
    if let Some(token) = token {
        req = req.header("authorization", format!("Bearer {}", token));
    }
    let res = app.clone().oneshot(req.body(Body::empty()).unwrap()).await.unwrap();
    let status = res.status();
    let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn token_of(body: &Value) -> String {
    body.get("token")
        .and_then(|v| v.as_str())
        .expect("response should contain token")
        .to_string()
}

fn roles_of(me: &Value) -> HashSet<String> {
    me["roles"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r.as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn health_returns_ok() {
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let res = app().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json.get("status").and_then(|v| v.as_str()), Some("ok"));
}

#[tokio::test]
async fn register_twice_is_rejected() {
    let app = app();
    let alice = json!({ "username": "alice", "email": "a@x.com", "password": "P@ssw0rd1" });

    let (status, body) = post_json(&app, "/api/account/register", alice.clone()).await;
    assert_eq!(status, StatusCode::OK, "register should succeed: {}", body);
    token_of(&body);

    let (status, body) = post_json(&app, "/api/account/register", alice).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "errors": ["User name is already taken"] }));
}

#[tokio::test]
async fn register_and_login() {
    let app = app();
    let (status, registered) = post_json(
        &app,
        "/api/account/register",
        json!({ "username": "carol", "email": "c@x.com", "password": "P@ssw0rd1" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, logged_in) = post_json(
        &app,
        "/api/account/login",
        json!({ "username": "Carol", "password": "P@ssw0rd1" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login should succeed");

    let (_, me_registered) = get_me(&app, Some(&token_of(&registered))).await;
    let (status, me_logged_in) = get_me(&app, Some(&token_of(&logged_in))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me_registered["name"], "carol");
    assert_eq!(me_registered["name"], me_logged_in["name"]);
    assert_eq!(roles_of(&me_logged_in), set(&["User"]));
}

#[tokio::test]
async fn register_admin_grants_only_administrator() {
    let app = app();
    let (status, body) = post_json(
        &app,
        "/api/account/register-admin",
        json!({ "username": "bob", "email": "b@x.com", "password": "P@ssw0rd1" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, me) = get_me(&app, Some(&token_of(&body))).await;
    let roles = roles_of(&me);
    assert!(roles.contains("Administrator"));
    assert!(!roles.contains("User"));
    assert!(!roles.contains("VipUser"));
}

#[tokio::test]
async fn register_vip_grants_vip_role() {
    let app = app();
    let (status, body) = post_json(
        &app,
        "/api/account/register-vip",
        json!({ "username": "vera", "email": "v@x.com", "password": "P@ssw0rd1" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, me) = get_me(&app, Some(&token_of(&body))).await;
    assert_eq!(roles_of(&me), set(&["VipUser"]));
}

#[tokio::test]
async fn login_failures_share_one_payload() {
    let app = app();
    post_json(
        &app,
        "/api/account/register",
        json!({ "username": "dave", "email": "d@x.com", "password": "P@ssw0rd1" }),
    )
    .await;

    let (wrong_status, wrong_body) = post_json(
        &app,
        "/api/account/login",
        json!({ "username": "dave", "password": "Wr0ng!pass" }),
    )
    .await;
    let (unknown_status, unknown_body) = post_json(
        &app,
        "/api/account/login",
        json!({ "username": "nobody", "password": "Wr0ng!pass" }),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_status, unknown_status);
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body, json!({ "errors": ["Invalid username or password"] }));
}

#[tokio::test]
async fn weak_password_lists_every_reason() {
    let (status, body) = post_json(
        &app(),
        "/api/account/register",
        json!({ "username": "erin", "email": "e@x.com", "password": "short" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errors = body["errors"].as_array().unwrap();
    assert!(errors.len() > 1, "expected several reasons: {}", body);
    assert!(errors
        .iter()
        .any(|e| e.as_str().unwrap().contains("at least 6 characters")));
}

#[tokio::test]
async fn malformed_bodies_are_bad_requests() {
    let app = app();
    let (status, body) = post_json(
        &app,
        "/api/account/register",
        json!({ "username": "", "email": "nope", "password": "P@ssw0rd1" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);

    let (status, body) = post_json(&app, "/api/account/login", json!({ "username": "x" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"].is_array());
}

#[tokio::test]
async fn me_requires_a_valid_bearer_token() {
    let app = app();
    let (status, _) = get_me(&app, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = get_me(&app, Some("not.a.token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["errors"].is_array());

    let foreign = TokenIssuer::new(
        JwtConfig::from_parts(
            Some("a-different-secret-entirely-here".to_string()),
            Some("authdemo".to_string()),
            Some("authdemo-clients".to_string()),
        )
        .unwrap(),
    )
    .issue("mallory", ["Administrator"])
    .unwrap();
    let (status, _) = get_me(&app, Some(&foreign.token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn postgres_register_and_login() {
    let database_url = match std::env::var("TEST_DATABASE_URL") {
        Ok(u) => u,
        Err(_) => {
            eprintln!("Skip integration test: set TEST_DATABASE_URL");
            return;
        }
    };
    let pool = match db::create_pool(&database_url).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Skip integration test: {}", e);
            return;
        }
    };
    db::migrate(&pool).await.unwrap();
    db::roles_ensure(&pool).await.unwrap();
    let app = app_with(Arc::new(db::PgUserRepository::new(pool)));

    let username = format!(
        "pg{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_millis()
    );
    let register_body = json!({ "username": username, "email": "pg@example.com", "password": "P@ssw0rd1" });
    let (status, _) = post_json(&app, "/api/account/register-admin", register_body.clone()).await;
    assert_eq!(status, StatusCode::OK, "register should succeed");

    let (status, body) = post_json(&app, "/api/account/register", register_body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "errors": ["User name is already taken"] }));

    let (status, body) = post_json(
        &app,
        "/api/account/login",
        json!({ "username": username.to_uppercase(), "password": "P@ssw0rd1" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login should succeed");
    let (_, me) = get_me(&app, Some(&token_of(&body))).await;
    assert_eq!(roles_of(&me), set(&["Administrator"]));
}
