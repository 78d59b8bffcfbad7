//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: per-shop orchestrators and webhook dispatch
//! - `routes/`: HTTP routes + handlers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;
use crate::signature::WebhookVerifier;

pub mod errors;
pub mod routes;
pub mod services;

pub use services::{AppState, Dispatch};

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(state: Arc<AppState>, verifier: WebhookVerifier) -> Router {
    let auth_state = middleware::WebhookAuthState {
        verifier: Arc::new(verifier),
    };

    // Webhook routes: require a valid delivery signature.
    let webhooks = routes::webhooks::router().layer(
        ServiceBuilder::new()
            .layer(Extension(state))
            .layer(axum::middleware::from_fn_with_state(
                auth_state,
                middleware::verify_webhook,
            )),
    );

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(webhooks)
}
