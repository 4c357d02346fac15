use super::schedule;
use crate::{modules::order, types::Context};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Deserialize)]
struct SlotFilters {
    date: Option<String>,
}

async fn get_slots(
    State(ctx): State<Arc<Context>>,
    Query(filters): Query<SlotFilters>,
) -> impl IntoResponse {
    let date = match filters.date {
        Some(date) => date,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Missing date" })),
            )
        }
    };

    let date = match NaiveDate::parse_from_str(&date, "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid date" })),
            )
        }
    };

    let counts = match order::repository::count_active_by_slot_for_date(
        &ctx.db_conn.pool,
        date.to_string(),
    )
    .await
    {
        Ok(counts) => counts
            .into_iter()
            .map(|row| (row.slot_time, row.count))
            .collect::<HashMap<String, i64>>(),
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch slot occupancy" })),
            )
        }
    };

    let slots = schedule::generate_slots(date, &ctx.schedule)
        .iter()
        .map(|slot| {
            let key = schedule::slot_key(slot);
            let count = counts.get(&key).copied().unwrap_or(0);

            json!({
                "time": key,
                "available": count < ctx.schedule.max_orders_per_slot,
            })
        })
        .collect::<Vec<_>>();

    (StatusCode::OK, Json(json!({ "slots": slots })))
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new().route("/slots", get(get_slots))
}
