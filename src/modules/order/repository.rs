use serde::{Deserialize, Serialize};
use sqlx::SqliteExecutor;
use std::str::FromStr;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Accepted,
    InProgress,
    Ready,
    Completed,
}

/// Statuses that occupy a slot. The availability listing and the creation
/// capacity check must count exactly the same set, so both build their SQL
/// from this constant.
pub const ACTIVE_STATUSES: [OrderStatus; 3] = [
    OrderStatus::Pending,
    OrderStatus::Accepted,
    OrderStatus::InProgress,
];

/// Statuses staff may set through the admin endpoint. `accepted` still
/// exists on the wire for older rows but is not settable anymore.
pub const SETTABLE_STATUSES: [OrderStatus; 4] = [
    OrderStatus::Pending,
    OrderStatus::InProgress,
    OrderStatus::Ready,
    OrderStatus::Completed,
];

impl ToString for OrderStatus {
    fn to_string(&self) -> String {
        match self {
            OrderStatus::Pending => String::from("pending"),
            OrderStatus::Accepted => String::from("accepted"),
            OrderStatus::InProgress => String::from("in_progress"),
            OrderStatus::Ready => String::from("ready"),
            OrderStatus::Completed => String::from("completed"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "accepted" => Ok(OrderStatus::Accepted),
            "in_progress" => Ok(OrderStatus::InProgress),
            "ready" => Ok(OrderStatus::Ready),
            "completed" => Ok(OrderStatus::Completed),
            _ => Err(format!("'{}' is not a valid OrderStatus", s)),
        }
    }
}

fn active_statuses_sql() -> String {
    ACTIVE_STATUSES
        .iter()
        .map(|status| format!("'{}'", status.to_string()))
        .collect::<Vec<String>>()
        .join(", ")
}

#[derive(Serialize, Deserialize, Clone, Debug, sqlx::FromRow)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub total_cents: i64,
    pub payment_method: String,
    pub slot_time: String,
    pub status: OrderStatus,
    pub created_at: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, sqlx::FromRow)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub menu_item_id: i64,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

/// One row of the staff day view: the order header joined with the customer
/// phone and a pre-rendered "Name xQty, ..." item summary.
#[derive(Serialize, Deserialize, Clone, Debug, sqlx::FromRow)]
pub struct AdminOrderRow {
    pub id: i64,
    pub slot_time: String,
    pub status: OrderStatus,
    pub total_cents: i64,
    pub phone: String,
    pub items: String,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct SlotCount {
    pub slot_time: String,
    pub count: i64,
}

#[derive(Debug)]
pub enum Error {
    UnexpectedError,
}

pub struct CreateOrderPayload {
    pub user_id: i64,
    pub total_cents: i64,
    pub payment_method: String,
    pub slot_time: String,
    pub max_orders_per_slot: i64,
}

/// Inserts the order header only while the slot still has capacity. The
/// occupancy re-check and the insert are one statement, so two concurrent
/// submissions cannot both observe a free slot and overbook it. Returns
/// `None` when the slot is already full.
pub async fn create<'e, E: SqliteExecutor<'e>>(
    e: E,
    payload: CreateOrderPayload,
) -> Result<Option<Order>, Error> {
    sqlx::query_as::<_, Order>(&format!(
        "
        INSERT INTO orders (user_id, total_cents, payment_method, slot_time, status)
        SELECT ?, ?, ?, ?, ?
        WHERE (
            SELECT COUNT(*) FROM orders
            WHERE slot_time = ? AND status IN ({})
        ) < ?
        RETURNING *
        ",
        active_statuses_sql()
    ))
    .bind(payload.user_id)
    .bind(payload.total_cents)
    .bind(payload.payment_method)
    .bind(payload.slot_time.clone())
    .bind(OrderStatus::Pending)
    .bind(payload.slot_time)
    .bind(payload.max_orders_per_slot)
    .fetch_optional(e)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while trying to create an order: {}", err);
        Error::UnexpectedError
    })
}

pub struct CreateOrderItemPayload {
    pub order_id: i64,
    pub menu_item_id: i64,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

pub async fn create_item<'e, E: SqliteExecutor<'e>>(
    e: E,
    payload: CreateOrderItemPayload,
) -> Result<OrderItem, Error> {
    sqlx::query_as::<_, OrderItem>(
        "
        INSERT INTO order_items (order_id, menu_item_id, quantity, unit_price_cents)
        VALUES (?, ?, ?, ?)
        RETURNING *
        ",
    )
    .bind(payload.order_id)
    .bind(payload.menu_item_id)
    .bind(payload.quantity)
    .bind(payload.unit_price_cents)
    .fetch_one(e)
    .await
    .map_err(|err| {
        tracing::error!(
            "Error occurred while trying to create an order item: {}",
            err
        );
        Error::UnexpectedError
    })
}

pub async fn count_active_by_slot_for_date<'e, E: SqliteExecutor<'e>>(
    e: E,
    date: String,
) -> Result<Vec<SlotCount>, Error> {
    sqlx::query_as::<_, SlotCount>(&format!(
        "
        SELECT slot_time, COUNT(*) AS count
        FROM orders
        WHERE DATE(slot_time) = ? AND status IN ({})
        GROUP BY slot_time
        ",
        active_statuses_sql()
    ))
    .bind(date)
    .fetch_all(e)
    .await
    .map_err(|err| {
        tracing::error!(
            "Error occurred while trying to count orders per slot: {}",
            err
        );
        Error::UnexpectedError
    })
}

pub async fn find_for_admin_by_date<'e, E: SqliteExecutor<'e>>(
    e: E,
    date: String,
) -> Result<Vec<AdminOrderRow>, Error> {
    sqlx::query_as::<_, AdminOrderRow>(
        "
        SELECT
            o.id,
            o.slot_time,
            o.status,
            o.total_cents,
            u.phone,
            GROUP_CONCAT(mi.name || ' x' || oi.quantity, ', ') AS items
        FROM orders o
        JOIN users u ON o.user_id = u.id
        JOIN order_items oi ON oi.order_id = o.id
        JOIN menu_items mi ON mi.id = oi.menu_item_id
        WHERE DATE(o.slot_time) = ?
        GROUP BY o.id
        ORDER BY o.slot_time ASC
        ",
    )
    .bind(date.clone())
    .fetch_all(e)
    .await
    .map_err(|err| {
        tracing::error!(
            "Error occurred while trying to fetch orders for date {}: {}",
            date,
            err
        );
        Error::UnexpectedError
    })
}

pub async fn update_status<'e, E: SqliteExecutor<'e>>(
    e: E,
    id: i64,
    status: OrderStatus,
) -> Result<Option<Order>, Error> {
    sqlx::query_as::<_, Order>("UPDATE orders SET status = ? WHERE id = ? RETURNING *")
        .bind(status)
        .bind(id)
        .fetch_optional(e)
        .await
        .map_err(|err| {
            tracing::error!(
                "Error occurred while trying to update status of order {}: {}",
                id,
                err
            );
            Error::UnexpectedError
        })
}
