use super::repository;
use crate::types::Context;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

async fn get_categories(State(ctx): State<Arc<Context>>) -> impl IntoResponse {
    match repository::find_categories(&ctx.db_conn.pool).await {
        Ok(categories) => (StatusCode::OK, Json(json!({ "categories": categories }))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch categories" })),
        ),
    }
}

#[derive(Deserialize)]
struct MenuFilters {
    category: Option<String>,
}

async fn get_menu(
    State(ctx): State<Arc<Context>>,
    Query(filters): Query<MenuFilters>,
) -> impl IntoResponse {
    let category = match filters.category {
        Some(category) => category,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Missing category" })),
            )
        }
    };

    match repository::find_active_by_category(&ctx.db_conn.pool, category).await {
        Ok(items) => (StatusCode::OK, Json(json!({ "items": items }))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch menu items" })),
        ),
    }
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/menu", get(get_menu))
}
