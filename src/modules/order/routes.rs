use super::repository;
use crate::{
    modules::{auth::middleware::AdminAuth, menu, slot::schedule},
    types::Context,
    utils::{notification, validation},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;
use validator::Validate;

#[derive(Deserialize, Validate, Clone)]
struct OrderLine {
    id: Option<i64>,
    #[validate(range(min = 0))]
    price_cents: Option<i64>,
    #[validate(range(min = 1))]
    quantity: Option<i64>,
}

#[derive(Deserialize, Validate)]
struct CreateOrderPayload {
    #[serde(rename = "userId")]
    user_id: Option<i64>,
    #[validate(nested)]
    items: Option<Vec<OrderLine>>,
    #[serde(rename = "paymentMethod")]
    payment_method: Option<String>,
    #[serde(rename = "slotTime")]
    slot_time: Option<String>,
}

struct ResolvedLine {
    menu_item_id: i64,
    quantity: i64,
    unit_price_cents: i64,
}

async fn create_order(
    State(ctx): State<Arc<Context>>,
    Json(payload): Json<CreateOrderPayload>,
) -> impl IntoResponse {
    let missing_data = (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Missing data" })),
    );

    if let Err(errors) = payload.validate() {
        return validation::into_response(errors);
    }

    let (user_id, lines, payment_method, slot_time) = match (
        payload.user_id,
        payload.items,
        payload.payment_method,
        payload.slot_time,
    ) {
        (Some(user_id), Some(items), Some(payment_method), Some(slot_time))
            if !items.is_empty() && !payment_method.is_empty() && !slot_time.is_empty() =>
        {
            (user_id, items, payment_method, slot_time)
        }
        _ => return missing_data,
    };

    let mut resolved = Vec::with_capacity(lines.len());
    for line in lines {
        match (line.id, line.price_cents, line.quantity) {
            (Some(menu_item_id), Some(unit_price_cents), Some(quantity)) => {
                resolved.push(ResolvedLine {
                    menu_item_id,
                    quantity,
                    unit_price_cents,
                });
            }
            _ => return missing_data,
        }
    }

    let slot = match schedule::parse_slot_time(&slot_time) {
        Some(slot) if schedule::is_on_grid(slot, &ctx.schedule) => slot,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid slot time" })),
            )
        }
    };
    let slot_key = schedule::slot_key(&slot);

    // Submitted prices may sit above the catalog price (composed items carry
    // their extras under the base item's id) but never below it.
    for line in resolved.iter() {
        match menu::repository::find_active_by_id(&ctx.db_conn.pool, line.menu_item_id).await {
            Ok(Some(item)) => {
                if line.unit_price_cents < item.price_cents {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(json!({ "error": "Invalid item price" })),
                    );
                }
            }
            Ok(None) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "Unknown menu item" })),
                )
            }
            Err(_) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Sorry, an error occurred" })),
                )
            }
        }
    }

    let total_cents = resolved
        .iter()
        .fold(0i64, |acc, line| acc + line.unit_price_cents * line.quantity);

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

    let order = match repository::create(
        &mut *tx,
        repository::CreateOrderPayload {
            user_id,
            total_cents,
            payment_method,
            slot_time: slot_key,
            max_orders_per_slot: ctx.schedule.max_orders_per_slot,
        },
    )
    .await
    {
        Ok(Some(order)) => order,
        Ok(None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Slot full" })),
            )
        }
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to create order" })),
            )
        }
    };

    let mut items = Vec::with_capacity(resolved.len());
    for line in resolved {
        match repository::create_item(
            &mut *tx,
            repository::CreateOrderItemPayload {
                order_id: order.id,
                menu_item_id: line.menu_item_id,
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
            },
        )
        .await
        {
            Ok(item) => items.push(item),
            Err(_) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to create order" })),
                )
            }
        }
    }

    if let Err(err) = tx.commit().await {
        tracing::error!("Failed to commit database transaction: {}", err);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to create order" })),
        );
    }

    tokio::spawn(notification::send(
        ctx.clone(),
        notification::Notification::order_placed(order.clone(), items),
    ));

    (
        StatusCode::OK,
        Json(json!({ "message": "Order created", "orderId": order.id })),
    )
}

#[derive(Deserialize)]
struct AdminOrderFilters {
    date: Option<String>,
}

async fn get_admin_orders(
    State(ctx): State<Arc<Context>>,
    _admin: AdminAuth,
    Query(filters): Query<AdminOrderFilters>,
) -> impl IntoResponse {
    let date = filters
        .date
        .unwrap_or_else(|| Utc::now().date_naive().to_string());

    match repository::find_for_admin_by_date(&ctx.db_conn.pool, date).await {
        Ok(orders) => (StatusCode::OK, Json(json!({ "orders": orders }))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch orders" })),
        ),
    }
}

#[derive(Deserialize)]
struct UpdateOrderStatusPayload {
    status: Option<String>,
}

async fn update_order_status(
    Path(id): Path<i64>,
    State(ctx): State<Arc<Context>>,
    _admin: AdminAuth,
    Json(payload): Json<UpdateOrderStatusPayload>,
) -> impl IntoResponse {
    let status = match payload
        .status
        .as_deref()
        .map(repository::OrderStatus::from_str)
    {
        Some(Ok(status)) if repository::SETTABLE_STATUSES.contains(&status) => status,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid status" })),
            )
        }
    };

    match repository::update_status(&ctx.db_conn.pool, id, status).await {
        Ok(Some(_)) => (StatusCode::OK, Json(json!({ "message": "Status updated" }))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Order not found" })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to update order status" })),
        ),
    }
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/admin/orders", get(get_admin_orders))
        .route("/admin/orders/:id/status", post(update_order_status))
}
