use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info};

use skusync_core::ShopDomain;
use skusync_events::{Topic, WebhookEnvelope};
use skusync_infra::{AppConfig, ShopifyCatalog};
use skusync_inventory::{CatalogError, Orchestrator, RecentCommitGuard, RunOutcome};
use skusync_observability::TracingObserver;

/// What happened to one verified delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    IgnoredTopic(Topic),
    /// No catalog credentials for the delivering shop.
    UnknownShop(ShopDomain),
    Ran(RunOutcome),
}

/// Orchestrators keyed by shop, each bound to that shop's catalog.
#[derive(Debug, Default)]
pub struct AppState {
    shops: HashMap<ShopDomain, Arc<Orchestrator>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shop(mut self, shop: ShopDomain, orchestrator: Orchestrator) -> Self {
        self.shops.insert(shop, Arc::new(orchestrator));
        self
    }

    /// Production wiring: Admin API catalog, tracing observer, optional echo guard.
    pub fn from_config(config: &AppConfig) -> Result<Self, CatalogError> {
        let catalog = ShopifyCatalog::new(&config.shop, config.http_timeout)?;

        let mut orchestrator =
            Orchestrator::new(Arc::new(catalog)).with_observer(Arc::new(TracingObserver));
        if let Some(ttl) = config.echo_guard_ttl {
            orchestrator = orchestrator.with_echo_guard(Arc::new(RecentCommitGuard::new(ttl)));
        }

        Ok(Self::new().with_shop(config.shop.domain.clone(), orchestrator))
    }

    pub fn orchestrator_for(&self, shop: &ShopDomain) -> Option<Arc<Orchestrator>> {
        self.shops.get(shop).cloned()
    }

    /// Route a verified delivery to its shop's orchestrator.
    ///
    /// Always completes; the run outcome is informational only.
    pub async fn dispatch(&self, envelope: WebhookEnvelope) -> Dispatch {
        if envelope.topic() != &Topic::InventoryLevelsUpdate {
            info!(topic = %envelope.topic(), shop = %envelope.shop(), "ignoring webhook topic");
            return Dispatch::IgnoredTopic(envelope.topic().clone());
        }

        let Some(orchestrator) = self.orchestrator_for(envelope.shop()) else {
            error!(shop = %envelope.shop(), "no catalog credentials for shop");
            return Dispatch::UnknownShop(envelope.shop().clone());
        };

        Dispatch::Ran(orchestrator.handle_isolated(envelope.into_payload()).await)
    }
}
