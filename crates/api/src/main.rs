use std::sync::Arc;

use anyhow::Context;

use skusync_api::{app, signature::WebhookVerifier};
use skusync_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    skusync_observability::init();

    let config = AppConfig::from_env().context("failed to load configuration")?;
    tracing::info!(shop = %config.shop.domain, echo_guard = config.echo_guard_ttl.is_some(), "starting");

    let state = app::AppState::from_config(&config).context("failed to build catalog client")?;
    let app = app::build_app(
        Arc::new(state),
        WebhookVerifier::new(config.api_secret.as_bytes()),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
