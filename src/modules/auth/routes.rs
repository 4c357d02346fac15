use super::repository;
use crate::{types::Context, utils::notification};
use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router,
};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Deserialize)]
struct RequestLoginCodePayload {
    phone: Option<String>,
    name: Option<String>,
}

async fn request_login_code(
    State(ctx): State<Arc<Context>>,
    Json(payload): Json<RequestLoginCodePayload>,
) -> impl IntoResponse {
    let phone = match payload.phone {
        Some(phone) if !phone.is_empty() => phone,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Missing phone number" })),
            )
        }
    };

    let user = match repository::find_user_by_phone(&ctx.db_conn.pool, phone.clone()).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            match repository::create_user(
                &ctx.db_conn.pool,
                repository::CreateUserPayload {
                    phone,
                    name: payload.name,
                },
            )
            .await
            {
                Ok(user) => user,
                Err(_) => {
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "error": "Failed to create user" })),
                    )
                }
            }
        }
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Sorry, an error occurred" })),
            )
        }
    };

    let code = rand::thread_rng().gen_range(100_000..=999_999).to_string();

    match repository::create_verification_code(
        &ctx.db_conn.pool,
        repository::CreateVerificationCodePayload {
            user_id: user.id,
            code: code.clone(),
        },
    )
    .await
    {
        Ok(_) => (),
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Sorry, an error occurred" })),
            )
        }
    };

    tokio::spawn(notification::send(
        ctx.clone(),
        notification::Notification::login_code_requested(user, code),
    ));

    (
        StatusCode::OK,
        Json(json!({ "message": "Code sent (SMS if configured, otherwise console)" })),
    )
}

#[derive(Deserialize)]
struct VerifyLoginCodePayload {
    phone: Option<String>,
    code: Option<String>,
}

async fn verify_login_code(
    State(ctx): State<Arc<Context>>,
    Json(payload): Json<VerifyLoginCodePayload>,
) -> impl IntoResponse {
    let (phone, code) = match (payload.phone, payload.code) {
        (Some(phone), Some(code)) if !phone.is_empty() && !code.is_empty() => (phone, code),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Missing phone number or code" })),
            )
        }
    };

    let check =
        match repository::find_latest_code_by_phone_and_code(&ctx.db_conn.pool, phone, code).await
        {
            Ok(Some(check)) => check,
            Ok(None) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "Invalid phone number or code" })),
                )
            }
            Err(_) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Sorry, an error occurred" })),
                )
            }
        };

    if check.used != 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Code already used" })),
        );
    }

    let expires_at = match DateTime::parse_from_rfc3339(&check.expires_at) {
        Ok(expires_at) => expires_at.with_timezone(&Utc),
        Err(err) => {
            tracing::error!(
                "Invalid expiry timestamp on verification code {}: {}",
                check.code_id,
                err
            );
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Sorry, an error occurred" })),
            );
        }
    };

    if expires_at < Utc::now() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Code expired" })),
        );
    }

    let mut tx = match ctx.db_conn.pool.begin().await {
        Ok(tx) => tx,
        Err(err) => {
            tracing::error!("Failed to start database transaction: {}", err);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Sorry, an error occurred" })),
            );
        }
    };

    match repository::mark_code_used(&mut *tx, check.code_id).await {
        Ok(_) => (),
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Sorry, an error occurred" })),
            )
        }
    };

    match repository::mark_user_verified(&mut *tx, check.user_id).await {
        Ok(_) => (),
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Sorry, an error occurred" })),
            )
        }
    };

    if let Err(err) = tx.commit().await {
        tracing::error!("Failed to commit database transaction: {}", err);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Sorry, an error occurred" })),
        );
    }

    (
        StatusCode::OK,
        Json(json!({ "message": "Login successful", "userId": check.user_id })),
    )
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/request-login-code", post(request_login_code))
        .route("/verify-login-code", post(verify_login_code))
}
