use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use skusync_core::{InventoryItemId, LocationId};

/// A validated inventory-level change: "item X at location Y now has Q".
///
/// Immutable once built. Zero and negative quantities are legitimate values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    item_id: InventoryItemId,
    location_id: LocationId,
    new_quantity: i64,
    /// Platform timestamp of the change, when the payload carried one.
    updated_at: Option<DateTime<Utc>>,
}

impl ChangeEvent {
    pub fn new(item_id: InventoryItemId, location_id: LocationId, new_quantity: i64) -> Self {
        Self {
            item_id,
            location_id,
            new_quantity,
            updated_at: None,
        }
    }

    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    pub fn item_id(&self) -> &InventoryItemId {
        &self.item_id
    }

    pub fn location_id(&self) -> &LocationId {
        &self.location_id
    }

    pub fn new_quantity(&self) -> i64 {
        self.new_quantity
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}
