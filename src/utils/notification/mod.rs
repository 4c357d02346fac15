pub mod pos;
pub mod sms;

use crate::{
    modules::auth::repository::User,
    modules::order::repository::{Order, OrderItem},
    types::Context,
};
use std::sync::Arc;

#[derive(Clone)]
pub enum Notification {
    LoginCodeRequested { user: User, code: String },
    OrderPlaced { order: Order, items: Vec<OrderItem> },
}

impl Notification {
    pub fn login_code_requested(user: User, code: String) -> Self {
        Self::LoginCodeRequested { user, code }
    }

    pub fn order_placed(order: Order, items: Vec<OrderItem>) -> Self {
        Self::OrderPlaced { order, items }
    }
}

#[derive(Debug)]
pub enum Error {
    NotSent,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Fire-and-forget delivery: callers `tokio::spawn` this and never await the
/// outcome. Failures are logged by the backends, not surfaced.
pub async fn send(ctx: Arc<Context>, notification: Notification) -> Result<()> {
    match notification {
        Notification::LoginCodeRequested { user, code } => {
            sms::send_login_code(ctx, user, code).await
        }
        Notification::OrderPlaced { order, items } => pos::forward_order(ctx, order, items).await,
    }
}
