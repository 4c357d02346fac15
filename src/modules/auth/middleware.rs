use crate::types::Context;
use axum::extract::{Extension, FromRequestParts};
use axum::http::{header, request::Parts, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{async_trait, Json, RequestPartsExt};
use axum_extra::TypedHeader;
use headers::{authorization::Basic, Authorization};
use serde_json::json;
use std::sync::Arc;

/// Challenges with `WWW-Authenticate` so hitting the admin pages from a
/// browser pops the native credentials prompt.
fn unauthorized() -> Response {
    let mut response = (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Unauthorized" })),
    )
        .into_response();

    response.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"admin\""),
    );

    response
}

#[derive(Clone)]
pub struct AdminAuth;

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AdminAuth {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Extension(ctx) = parts
            .extract::<Extension<Arc<Context>>>()
            .await
            .map_err(|_| unauthorized())?;

        let TypedHeader(Authorization(credentials)) = parts
            .extract::<TypedHeader<Authorization<Basic>>>()
            .await
            .map_err(|_| unauthorized())?;

        if credentials.username() != ctx.admin.username
            || credentials.password() != ctx.admin.password
        {
            return Err(unauthorized());
        }

        Ok(Self)
    }
}
