//! In-process test harness: a file-backed SQLite database in a temp
//! directory plus the real router, driven through `tower::ServiceExt::oneshot`
//! without binding a socket.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use http_body_util::BodyExt;
use snackbar_backend_rs::{
    app,
    types::{AdminContext, AppContext, AppEnvironment, Context, ScheduleContext},
    utils::database,
};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "secret";

pub struct TestApp {
    pub ctx: Arc<Context>,
    pub router: axum::Router,
    _db_dir: TempDir,
}

pub async fn spawn_app() -> TestApp {
    let db_dir = tempfile::tempdir().expect("failed to create a temp dir");
    let db_path = db_dir.path().join("snack.db");

    let db_conn = database::connect(&format!("sqlite://{}", db_path.display())).await;
    database::migrate(db_conn.clone()).await;

    let ctx = Arc::new(Context {
        app: AppContext {
            host: "127.0.0.1".to_string(),
            environment: AppEnvironment::Development,
            port: 0,
            url: "http://127.0.0.1:0".to_string(),
            snack_name: "Test Snack".to_string(),
        },
        db_conn,
        admin: AdminContext {
            username: ADMIN_USER.to_string(),
            password: ADMIN_PASSWORD.to_string(),
        },
        schedule: ScheduleContext {
            open_hour: 11,
            close_hour: 22,
            slot_interval_minutes: 5,
            max_orders_per_slot: 2,
        },
        sms: None,
        pos: None,
    });

    let router = app::build_router(ctx.clone());

    TestApp {
        ctx,
        router,
        _db_dir: db_dir,
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("failed to build request")
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

pub fn basic_auth_value(username: &str, password: &str) -> String {
    format!(
        "Basic {}",
        BASE64_STANDARD.encode(format!("{}:{}", username, password))
    )
}

pub fn get_as(uri: &str, username: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, basic_auth_value(username, password))
        .body(Body::empty())
        .expect("failed to build request")
}

pub fn admin_get(uri: &str) -> Request<Body> {
    get_as(uri, ADMIN_USER, ADMIN_PASSWORD)
}

pub fn admin_post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::AUTHORIZATION,
            basic_auth_value(ADMIN_USER, ADMIN_PASSWORD),
        )
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

/// Drive the router with a single request and return (status, body bytes).
pub async fn call(router: axum::Router, req: Request<Body>) -> (StatusCode, bytes::Bytes) {
    let res = router.oneshot(req).await.expect("oneshot failed");
    let status = res.status();
    let body = res
        .into_body()
        .collect()
        .await
        .expect("body collect failed")
        .to_bytes();
    (status, body)
}

pub fn parse_json(body: bytes::Bytes) -> serde_json::Value {
    serde_json::from_slice(&body).expect("body is not valid JSON")
}

/// The issued login codes never reach the test process any other way, so
/// read the latest one straight from the database.
pub async fn latest_code_for_phone(app: &TestApp, phone: &str) -> String {
    sqlx::query_scalar::<_, String>(
        "
        SELECT vc.code FROM verification_codes vc
        JOIN users u ON vc.user_id = u.id
        WHERE u.phone = ?
        ORDER BY vc.id DESC
        LIMIT 1
        ",
    )
    .bind(phone)
    .fetch_one(&app.ctx.db_conn.pool)
    .await
    .expect("no verification code issued")
}

/// Full phone login: request a code, fish it out of the database, verify it.
pub async fn login(app: &TestApp, phone: &str) -> i64 {
    let (status, _) = call(
        app.router.clone(),
        post_json("/api/request-login-code", serde_json::json!({ "phone": phone })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let code = latest_code_for_phone(app, phone).await;

    let (status, body) = call(
        app.router.clone(),
        post_json(
            "/api/verify-login-code",
            serde_json::json!({ "phone": phone, "code": code }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    parse_json(body)["userId"].as_i64().expect("missing userId")
}
