use chrono::{Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqliteExecutor;

#[derive(Serialize, Deserialize, Clone, Debug, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub phone: String,
    pub name: Option<String>,
    pub phone_verified: i64,
    pub created_at: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, sqlx::FromRow)]
pub struct VerificationCode {
    pub id: i64,
    pub user_id: i64,
    pub code: String,
    pub expires_at: String,
    pub used: i64,
}

/// Join row for the verify step: the most recent code issued for a
/// (phone, code) pair, plus the owning user.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct VerificationCodeCheck {
    pub user_id: i64,
    pub code_id: i64,
    pub expires_at: String,
    pub used: i64,
}

#[derive(Debug)]
pub enum Error {
    UnexpectedError,
}

const CODE_TTL_MINUTES: i64 = 15;

pub async fn find_user_by_phone<'e, E: SqliteExecutor<'e>>(
    e: E,
    phone: String,
) -> Result<Option<User>, Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE phone = ?")
        .bind(phone)
        .fetch_optional(e)
        .await
        .map_err(|err| {
            tracing::error!("Error occurred while trying to fetch user by phone: {}", err);
            Error::UnexpectedError
        })
}

pub struct CreateUserPayload {
    pub phone: String,
    pub name: Option<String>,
}

pub async fn create_user<'e, E: SqliteExecutor<'e>>(
    e: E,
    payload: CreateUserPayload,
) -> Result<User, Error> {
    sqlx::query_as::<_, User>("INSERT INTO users (phone, name) VALUES (?, ?) RETURNING *")
        .bind(payload.phone)
        .bind(payload.name)
        .fetch_one(e)
        .await
        .map_err(|err| {
            tracing::error!("Error occurred while trying to create a user: {}", err);
            Error::UnexpectedError
        })
}

pub struct CreateVerificationCodePayload {
    pub user_id: i64,
    pub code: String,
}

pub async fn create_verification_code<'e, E: SqliteExecutor<'e>>(
    e: E,
    payload: CreateVerificationCodePayload,
) -> Result<VerificationCode, Error> {
    let expires_at = (Utc::now() + Duration::minutes(CODE_TTL_MINUTES))
        .to_rfc3339_opts(SecondsFormat::Millis, true);

    sqlx::query_as::<_, VerificationCode>(
        "INSERT INTO verification_codes (user_id, code, expires_at) VALUES (?, ?, ?) RETURNING *",
    )
    .bind(payload.user_id)
    .bind(payload.code)
    .bind(expires_at)
    .fetch_one(e)
    .await
    .map_err(|err| {
        tracing::error!(
            "Error occurred while trying to create a verification code: {}",
            err
        );
        Error::UnexpectedError
    })
}

pub async fn find_latest_code_by_phone_and_code<'e, E: SqliteExecutor<'e>>(
    e: E,
    phone: String,
    code: String,
) -> Result<Option<VerificationCodeCheck>, Error> {
    sqlx::query_as::<_, VerificationCodeCheck>(
        "
        SELECT u.id AS user_id, vc.id AS code_id, vc.expires_at, vc.used
        FROM users u
        JOIN verification_codes vc ON vc.user_id = u.id
        WHERE u.phone = ? AND vc.code = ?
        ORDER BY vc.id DESC
        LIMIT 1
        ",
    )
    .bind(phone)
    .bind(code)
    .fetch_optional(e)
    .await
    .map_err(|err| {
        tracing::error!(
            "Error occurred while trying to fetch a verification code: {}",
            err
        );
        Error::UnexpectedError
    })
}

pub async fn mark_code_used<'e, E: SqliteExecutor<'e>>(e: E, id: i64) -> Result<(), Error> {
    sqlx::query("UPDATE verification_codes SET used = 1 WHERE id = ?")
        .bind(id)
        .execute(e)
        .await
        .map(|_| ())
        .map_err(|err| {
            tracing::error!("Error occurred while trying to mark code {} used: {}", id, err);
            Error::UnexpectedError
        })
}

pub async fn mark_user_verified<'e, E: SqliteExecutor<'e>>(e: E, id: i64) -> Result<(), Error> {
    sqlx::query("UPDATE users SET phone_verified = 1 WHERE id = ?")
        .bind(id)
        .execute(e)
        .await
        .map(|_| ())
        .map_err(|err| {
            tracing::error!(
                "Error occurred while trying to mark user {} verified: {}",
                id,
                err
            );
            Error::UnexpectedError
        })
}
