use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};
use serde_json::json;

use super::{auth, menu, order, slot};
use crate::types::Context;
use std::sync::Arc;

async fn welcome() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "message": "Welcome to the Snack API" })),
    )
}

async fn get_config(State(ctx): State<Arc<Context>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "snackName": ctx.app.snack_name })),
    )
}

pub fn get_router() -> Router<Arc<Context>> {
    // The public paths predate this codebase, so the module routers carry
    // full paths and get merged instead of nested under a prefix.
    Router::new()
        .route("/", get(welcome))
        .route("/config", get(get_config))
        .merge(menu::get_router())
        .merge(auth::get_router())
        .merge(slot::get_router())
        .merge(order::get_router())
}
