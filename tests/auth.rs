mod common;

use axum::http::StatusCode;
use common::{call, latest_code_for_phone, parse_json, post_json, spawn_app};
use serde_json::json;

#[tokio::test]
async fn request_login_code_requires_a_phone() {
    let app = spawn_app().await;

    for payload in [json!({}), json!({ "phone": "" }), json!({ "name": "Ana" })] {
        let (status, body) =
            call(app.router.clone(), post_json("/api/request-login-code", payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(parse_json(body)["error"], "Missing phone number");
    }
}

#[tokio::test]
async fn request_login_code_creates_the_user_once() {
    let app = spawn_app().await;

    let (status, _) = call(
        app.router.clone(),
        post_json(
            "/api/request-login-code",
            json!({ "phone": "+33611111111", "name": "Ana" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // A second request issues a new code but never a second account, and
    // the stored name is not overwritten.
    let (status, _) = call(
        app.router.clone(),
        post_json(
            "/api/request-login-code",
            json!({ "phone": "+33611111111", "name": "Somebody Else" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE phone = ?")
        .bind("+33611111111")
        .fetch_one(&app.ctx.db_conn.pool)
        .await
        .unwrap();
    assert_eq!(users, 1);

    let name = sqlx::query_scalar::<_, Option<String>>("SELECT name FROM users WHERE phone = ?")
        .bind("+33611111111")
        .fetch_one(&app.ctx.db_conn.pool)
        .await
        .unwrap();
    assert_eq!(name.as_deref(), Some("Ana"));

    let codes =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM verification_codes")
            .fetch_one(&app.ctx.db_conn.pool)
            .await
            .unwrap();
    assert_eq!(codes, 2);
}

#[tokio::test]
async fn verify_requires_phone_and_code() {
    let app = spawn_app().await;

    for payload in [
        json!({}),
        json!({ "phone": "+33611111111" }),
        json!({ "code": "123456" }),
        json!({ "phone": "+33611111111", "code": "" }),
    ] {
        let (status, body) =
            call(app.router.clone(), post_json("/api/verify-login-code", payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(parse_json(body)["error"], "Missing phone number or code");
    }
}

#[tokio::test]
async fn verify_rejects_an_unknown_code() {
    let app = spawn_app().await;

    let (status, _) = call(
        app.router.clone(),
        post_json("/api/request-login-code", json!({ "phone": "+33611111111" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Issued codes are six digits starting at 100000, so this can never match.
    let (status, body) = call(
        app.router.clone(),
        post_json(
            "/api/verify-login-code",
            json!({ "phone": "+33611111111", "code": "000000" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parse_json(body)["error"], "Invalid phone number or code");

    // Same code, wrong phone.
    let code = latest_code_for_phone(&app, "+33611111111").await;
    let (status, _) = call(
        app.router.clone(),
        post_json(
            "/api/verify-login-code",
            json!({ "phone": "+33622222222", "code": code }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn verify_logs_the_user_in() {
    let app = spawn_app().await;

    let (status, _) = call(
        app.router.clone(),
        post_json("/api/request-login-code", json!({ "phone": "+33611111111" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let code = latest_code_for_phone(&app, "+33611111111").await;

    let (status, body) = call(
        app.router.clone(),
        post_json(
            "/api/verify-login-code",
            json!({ "phone": "+33611111111", "code": code }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let json = parse_json(body);
    assert_eq!(json["message"], "Login successful");
    let user_id = json["userId"].as_i64().expect("missing userId");

    let verified =
        sqlx::query_scalar::<_, i64>("SELECT phone_verified FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_one(&app.ctx.db_conn.pool)
            .await
            .unwrap();
    assert_eq!(verified, 1);
}

#[tokio::test]
async fn a_code_is_single_use() {
    let app = spawn_app().await;

    let user_id = common::login(&app, "+33611111111").await;
    assert!(user_id > 0);

    let code = latest_code_for_phone(&app, "+33611111111").await;
    let (status, body) = call(
        app.router.clone(),
        post_json(
            "/api/verify-login-code",
            json!({ "phone": "+33611111111", "code": code }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parse_json(body)["error"], "Code already used");
}

#[tokio::test]
async fn an_expired_code_is_rejected() {
    let app = spawn_app().await;

    let (status, _) = call(
        app.router.clone(),
        post_json("/api/request-login-code", json!({ "phone": "+33611111111" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    sqlx::query("UPDATE verification_codes SET expires_at = '2020-01-01T00:00:00.000Z'")
        .execute(&app.ctx.db_conn.pool)
        .await
        .unwrap();

    let code = latest_code_for_phone(&app, "+33611111111").await;
    let (status, body) = call(
        app.router.clone(),
        post_json(
            "/api/verify-login-code",
            json!({ "phone": "+33611111111", "code": code }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parse_json(body)["error"], "Code expired");
}

#[tokio::test]
async fn an_older_unused_code_still_verifies() {
    let app = spawn_app().await;

    let (status, _) = call(
        app.router.clone(),
        post_json("/api/request-login-code", json!({ "phone": "+33611111111" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let first_code = latest_code_for_phone(&app, "+33611111111").await;

    let (status, _) = call(
        app.router.clone(),
        post_json("/api/request-login-code", json!({ "phone": "+33611111111" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The lookup is by (phone, code) pair, so requesting a fresh code does
    // not invalidate the previous one before it expires.
    let (status, body) = call(
        app.router.clone(),
        post_json(
            "/api/verify-login-code",
            json!({ "phone": "+33611111111", "code": first_code }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse_json(body)["message"], "Login successful");
}
