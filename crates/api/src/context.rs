use skusync_core::ShopDomain;
use skusync_events::Topic;

/// Delivery metadata of a verified webhook request.
///
/// Inserted by the signature middleware; present on every webhook route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookContext {
    shop: ShopDomain,
    topic: Topic,
    webhook_id: Option<String>,
}

impl WebhookContext {
    pub fn new(shop: ShopDomain, topic: Topic, webhook_id: Option<String>) -> Self {
        Self {
            shop,
            topic,
            webhook_id,
        }
    }

    pub fn shop(&self) -> &ShopDomain {
        &self.shop
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn webhook_id(&self) -> Option<&str> {
        self.webhook_id.as_deref()
    }
}
