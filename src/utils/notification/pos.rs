use super::{Error, Result};
use crate::{
    modules::order::repository::{Order, OrderItem},
    types::Context,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const MAX_ATTEMPTS: u32 = 3;

/// Pushes a freshly created order to the counter's point-of-sale system.
/// The order is already committed, so delivery is retried a few times and
/// then given up on; idempotent handling of duplicates is the receiver's
/// concern.
pub async fn forward_order(ctx: Arc<Context>, order: Order, items: Vec<OrderItem>) -> Result<()> {
    let pos = match ctx.pos.as_ref() {
        Some(pos) => pos,
        None => {
            tracing::debug!("Pos forwarding not configured, skipping order {}", order.id);
            return Ok(());
        }
    };

    let payload = json!({ "order": order, "items": items });
    let client = reqwest::Client::new();
    let mut backoff = Duration::from_millis(500);

    for attempt in 1..=MAX_ATTEMPTS {
        match client
            .post(pos.forward_url.clone())
            .json(&payload)
            .send()
            .await
        {
            Ok(res) if res.status().is_success() => {
                tracing::debug!("Order {} forwarded to pos", order.id);
                return Ok(());
            }
            Ok(res) => {
                tracing::warn!(
                    "Pos rejected order {} on attempt {}: {}",
                    order.id,
                    attempt,
                    res.status()
                );
            }
            Err(err) => {
                tracing::warn!(
                    "Failed to forward order {} on attempt {}: {}",
                    order.id,
                    attempt,
                    err
                );
            }
        }

        if attempt < MAX_ATTEMPTS {
            tokio::time::sleep(backoff).await;
            backoff *= 2;
        }
    }

    tracing::error!(
        "Giving up on forwarding order {} after {} attempts",
        order.id,
        MAX_ATTEMPTS
    );

    Err(Error::NotSent)
}
