use serde::{Deserialize, Serialize};
use sqlx::SqliteExecutor;

#[derive(Serialize, Deserialize, Clone, Debug, sqlx::FromRow)]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub category: String,
    pub is_active: i64,
}

#[derive(Debug)]
pub enum Error {
    UnexpectedError,
}

pub async fn find_categories<'e, E: SqliteExecutor<'e>>(e: E) -> Result<Vec<String>, Error> {
    sqlx::query_scalar::<_, String>("SELECT DISTINCT category FROM menu_items WHERE is_active = 1")
        .fetch_all(e)
        .await
        .map_err(|err| {
            tracing::error!(
                "Error occurred while trying to fetch menu categories: {}",
                err
            );
            Error::UnexpectedError
        })
}

pub async fn find_active_by_category<'e, E: SqliteExecutor<'e>>(
    e: E,
    category: String,
) -> Result<Vec<MenuItem>, Error> {
    sqlx::query_as::<_, MenuItem>("SELECT * FROM menu_items WHERE is_active = 1 AND category = ?")
        .bind(category)
        .fetch_all(e)
        .await
        .map_err(|err| {
            tracing::error!(
                "Error occurred while trying to fetch menu items by category: {}",
                err
            );
            Error::UnexpectedError
        })
}

pub async fn find_active_by_id<'e, E: SqliteExecutor<'e>>(
    e: E,
    id: i64,
) -> Result<Option<MenuItem>, Error> {
    sqlx::query_as::<_, MenuItem>("SELECT * FROM menu_items WHERE is_active = 1 AND id = ?")
        .bind(id)
        .fetch_optional(e)
        .await
        .map_err(|err| {
            tracing::error!(
                "Error occurred while trying to fetch menu item by id {}: {}",
                id,
                err
            );
            Error::UnexpectedError
        })
}
