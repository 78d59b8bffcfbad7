use serde_json::Value as JsonValue;

use skusync_core::ShopDomain;

use crate::Topic;

/// A delivered, already-authenticated webhook.
///
/// Signature verification happens before an envelope is constructed; anything
/// holding a `WebhookEnvelope` may trust its origin. The payload stays
/// untyped here and is only interpreted by [`crate::normalize`].
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEnvelope {
    topic: Topic,
    shop: ShopDomain,
    /// Delivery id from the platform; repeats on redelivery.
    webhook_id: Option<String>,
    payload: JsonValue,
}

impl WebhookEnvelope {
    pub fn new(
        topic: Topic,
        shop: ShopDomain,
        webhook_id: Option<String>,
        payload: JsonValue,
    ) -> Self {
        Self {
            topic,
            shop,
            webhook_id,
            payload,
        }
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn shop(&self) -> &ShopDomain {
        &self.shop
    }

    pub fn webhook_id(&self) -> Option<&str> {
        self.webhook_id.as_deref()
    }

    pub fn payload(&self) -> &JsonValue {
        &self.payload
    }

    pub fn into_payload(self) -> JsonValue {
        self.payload
    }
}
