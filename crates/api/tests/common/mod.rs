//! Common test utilities for integration tests.
//!
//! These tests run against a real PostgreSQL database named by the
//! `TEST_DATABASE_URL` environment variable. When the variable is not set
//! each test logs a skip notice and returns early, so the suite stays
//! green on machines without a database.

// Allow dead code in this module - these are helper utilities that may not be
// used by all integration tests but are intentionally available for future use.
#![allow(dead_code)]

use axum::Router;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use uuid::Uuid;
use visitor_gate_api::{app::create_app, config::Config};

/// Connect to the test database, or None when `TEST_DATABASE_URL` is unset.
pub async fn try_create_test_pool() -> Option<PgPool> {
    let database_url = match std::env::var("TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("TEST_DATABASE_URL not set, skipping integration test");
            return None;
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    Some(pool)
}

/// Run migrations on the test database.
pub async fn run_migrations(pool: &PgPool) {
    let migration_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("persistence/src/migrations");

    let mut entries: Vec<_> = std::fs::read_dir(&migration_dir)
        .expect("Failed to read migrations directory")
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().map(|ext| ext == "sql").unwrap_or(false))
        .collect();

    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let sql = std::fs::read_to_string(entry.path()).expect("Failed to read migration file");

        // Migration might already be applied, ignore errors
        sqlx::raw_sql(&sql).execute(pool).await.ok();
    }
}

/// Shared secret the test config mints tokens with.
pub const TEST_JWT_SECRET: &str = "integration-test-secret";

/// HMAC key the test config signs passes with.
pub const TEST_SIGNING_SECRET: &str = "integration-test-signing-secret";

/// Test configuration: HS256 tokens, console email, no rate limiting.
pub fn test_config() -> Config {
    test_config_with(&[])
}

/// Test configuration with additional overrides applied on top of the
/// embedded defaults.
pub fn test_config_with(overrides: &[(&str, &str)]) -> Config {
    let database_url = std::env::var("TEST_DATABASE_URL")
        .expect("TEST_DATABASE_URL must be set for integration tests");

    let mut all: Vec<(&str, &str)> = vec![("database.url", database_url.as_str())];
    all.extend_from_slice(overrides);

    Config::load_for_test(&all).expect("Failed to build test config")
}

/// Create a test application router.
pub fn create_test_app(config: Config, pool: PgPool) -> Router {
    create_app(config, pool)
}

/// Authenticated staff member for tests.
pub struct TestStaff {
    pub user_id: Uuid,
    pub display_name: String,
    pub role: String,
    pub token: String,
}

/// Mint an access token for a staff member with the given role.
///
/// Roles: admin, employee, security.
pub fn staff_with_role(role: &str) -> TestStaff {
    let user_id = Uuid::new_v4();
    let display_name = format!("Test {}", role);
    let jwt = shared::jwt::JwtConfig::from_shared_secret(TEST_JWT_SECRET, 3600, 30);
    let (token, _jti) = jwt
        .generate_access_token(user_id, &display_name, role)
        .expect("Failed to mint test token");

    TestStaff {
        user_id,
        display_name,
        role: role.to_string(),
        token,
    }
}

/// Clean up ALL test data from the database.
pub async fn cleanup_all_test_data(pool: &PgPool) {
    for table in ["pre_approvals", "visitors"] {
        sqlx::query(&format!("TRUNCATE TABLE {} CASCADE", table))
            .execute(pool)
            .await
            .ok();
    }
}

/// Build a JSON request with authentication.
pub fn json_request_with_auth(
    method: axum::http::Method,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> axum::http::Request<axum::body::Body> {
    use axum::{
        body::Body,
        http::{header, Request},
    };

    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Build a GET request with authentication.
pub fn get_request_with_auth(uri: &str, token: &str) -> axum::http::Request<axum::body::Body> {
    use axum::{
        body::Body,
        http::{header, Method, Request},
    };

    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

/// Build a POST request with authentication and an empty body.
pub fn post_request_with_auth(uri: &str, token: &str) -> axum::http::Request<axum::body::Body> {
    use axum::{
        body::Body,
        http::{Method, Request},
    };

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(axum::http::header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

/// Helper to parse JSON response body.
pub async fn parse_response_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
}

/// A valid pre-approval creation payload for tomorrow.
pub fn pre_approval_payload() -> serde_json::Value {
    let tomorrow = (chrono::Utc::now() + chrono::Duration::days(1)).date_naive();
    serde_json::json!({
        "visitor_name": "Jane Roe",
        "visitor_email": format!("jane-{}@example.com", Uuid::new_v4().simple()),
        "visitor_phone": "+1-555-0100",
        "purpose": "Business Meeting",
        "scheduled_date": tomorrow.to_string(),
        "start_time": "10:00",
        "end_time": "11:00"
    })
}

/// A valid walk-in registration payload naming the given host.
pub fn visitor_payload(host_id: Uuid, host_name: &str) -> serde_json::Value {
    serde_json::json!({
        "full_name": "John Doe",
        "contact_number": "+1-555-0123",
        "email": format!("john-{}@example.com", Uuid::new_v4().simple()),
        "purpose": "Interview",
        "host_id": host_id.to_string(),
        "host_name": host_name,
        "host_department": "Engineering",
        "company_name": "Tech Corp"
    })
}

/// Create a pre-approval via the API and return the response body.
pub async fn create_test_pre_approval(app: &Router, staff: &TestStaff) -> serde_json::Value {
    use axum::http::{Method, StatusCode};
    use tower::ServiceExt;

    let request = json_request_with_auth(
        Method::POST,
        "/api/v1/pre-approvals",
        pre_approval_payload(),
        &staff.token,
    );

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = parse_response_body(response).await;
    assert_eq!(
        status,
        StatusCode::CREATED,
        "Failed to create pre-approval: {:?}",
        body
    );
    body
}

/// Register a walk-in visitor via the API and return the response body.
pub async fn create_test_visitor(
    app: &Router,
    staff: &TestStaff,
    host: &TestStaff,
) -> serde_json::Value {
    use axum::http::{Method, StatusCode};
    use tower::ServiceExt;

    let request = json_request_with_auth(
        Method::POST,
        "/api/v1/visitors",
        visitor_payload(host.user_id, &host.display_name),
        &staff.token,
    );

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = parse_response_body(response).await;
    assert_eq!(
        status,
        StatusCode::CREATED,
        "Failed to register visitor: {:?}",
        body
    );
    body
}
