use std::sync::Arc;

use axum::{body::Bytes, extract::Extension, http::StatusCode, routing::post, Router};
use serde_json::Value as JsonValue;
use tracing::info;

use skusync_events::WebhookEnvelope;

use crate::app::services::{AppState, Dispatch};
use crate::context::WebhookContext;

pub fn router() -> Router {
    Router::new().route(
        "/webhooks/inventory-levels-update",
        post(inventory_levels_update),
    )
}

/// Inventory-level change intake.
///
/// Every verified delivery is acknowledged with `200 OK`, whatever the
/// reconciliation outcome; failures are only visible in the logs.
pub async fn inventory_levels_update(
    Extension(state): Extension<Arc<AppState>>,
    Extension(ctx): Extension<WebhookContext>,
    body: Bytes,
) -> StatusCode {
    info!(
        topic = %ctx.topic(),
        shop = %ctx.shop(),
        webhook_id = ctx.webhook_id().unwrap_or("-"),
        "webhook received"
    );

    // Unparsable JSON goes through the normalizer like any other bad payload.
    let payload: JsonValue = serde_json::from_slice(&body).unwrap_or(JsonValue::Null);
    let envelope = WebhookEnvelope::new(
        ctx.topic().clone(),
        ctx.shop().clone(),
        ctx.webhook_id().map(str::to_string),
        payload,
    );

    if let Dispatch::Ran(outcome) = state.dispatch(envelope).await {
        info!(shop = %ctx.shop(), outcome = outcome.as_str(), "webhook processed");
    }
    StatusCode::OK
}
