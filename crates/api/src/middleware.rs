use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use skusync_core::ShopDomain;
use skusync_events::Topic;

use crate::app::errors::json_error;
use crate::context::WebhookContext;
use crate::signature::WebhookVerifier;

pub const HMAC_HEADER: &str = "x-shopify-hmac-sha256";
pub const SHOP_HEADER: &str = "x-shopify-shop-domain";
pub const TOPIC_HEADER: &str = "x-shopify-topic";
pub const WEBHOOK_ID_HEADER: &str = "x-shopify-webhook-id";

/// Upper bound on a webhook body; inventory payloads are a few hundred bytes.
pub const MAX_WEBHOOK_BODY: usize = 256 * 1024;

#[derive(Clone)]
pub struct WebhookAuthState {
    pub verifier: Arc<WebhookVerifier>,
}

/// Verify the delivery signature and attach a [`WebhookContext`].
///
/// The body is buffered to compute the HMAC and handed on unchanged.
pub async fn verify_webhook(
    State(state): State<WebhookAuthState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let (parts, body) = req.into_parts();

    let bytes = match to_bytes(body, MAX_WEBHOOK_BODY).await {
        Ok(b) => b,
        Err(_) => {
            return json_error(StatusCode::PAYLOAD_TOO_LARGE, "body_too_large", "webhook body too large");
        }
    };

    let Some(signature) = header(&parts.headers, HMAC_HEADER) else {
        warn!("webhook without signature header rejected");
        return json_error(StatusCode::UNAUTHORIZED, "missing_signature", "missing signature");
    };
    if let Err(e) = state.verifier.verify(&bytes, signature) {
        warn!(error = %e, "webhook signature rejected");
        return json_error(StatusCode::UNAUTHORIZED, "invalid_signature", e.to_string());
    }

    let shop = match header(&parts.headers, SHOP_HEADER).map(str::parse::<ShopDomain>) {
        Some(Ok(shop)) => shop,
        _ => return json_error(StatusCode::BAD_REQUEST, "invalid_shop", "missing or invalid shop domain"),
    };
    let topic = Topic::parse(header(&parts.headers, TOPIC_HEADER).unwrap_or_default());
    let webhook_id = header(&parts.headers, WEBHOOK_ID_HEADER).map(str::to_string);

    let mut req = Request::from_parts(parts, Body::from(bytes));
    req.extensions_mut()
        .insert(WebhookContext::new(shop, topic, webhook_id));

    next.run(req).await
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
