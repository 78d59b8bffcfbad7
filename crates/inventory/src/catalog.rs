//! Catalog capability consumed by the reconciliation core.
//!
//! The core never talks to the platform directly; it is handed something that
//! implements [`CatalogApi`]. Credentials, transport and retries (if any) are
//! the implementor's business.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use skusync_core::{InventoryItemId, LocationId};

use crate::sku::Sku;

/// One catalog entry (product variant) as returned by a SKU search.
///
/// `item_id` is optional because the platform may return variants whose
/// inventory record cannot be resolved (e.g. not visible to the app).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub item_id: Option<InventoryItemId>,
    pub sku: Option<String>,
}

impl CatalogItem {
    pub fn new(item_id: InventoryItemId, sku: impl Into<String>) -> Self {
        Self {
            item_id: Some(item_id),
            sku: Some(sku.into()),
        }
    }
}

/// `{item, quantity}` pair of a bulk quantity write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemQuantity {
    pub item_id: InventoryItemId,
    pub quantity: i64,
}

/// Options of the bulk quantity write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetQuantitiesOptions {
    /// Quantity name being written.
    pub quantity_name: String,
    /// Reason code attached to the inventory adjustment.
    pub reason: String,
    /// Last write wins: skip the compare-and-set against the previous value.
    pub ignore_compare_quantity: bool,
}

impl Default for SetQuantitiesOptions {
    fn default() -> Self {
        Self {
            quantity_name: "available".to_string(),
            reason: "correction".to_string(),
            ignore_compare_quantity: true,
        }
    }
}

/// Field-level rejection returned by the bulk write (`userErrors`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Path to the offending input, e.g. `["input", "quantities", "1", "locationId"]`.
    pub field: Vec<String>,
    pub message: String,
}

impl FieldError {
    pub fn new(field: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    /// Index of the rejected entry in the submitted `quantities` list, if the
    /// path points at one.
    pub fn quantity_index(&self) -> Option<usize> {
        let pos = self.field.iter().position(|f| f == "quantities")?;
        self.field.get(pos + 1)?.parse().ok()
    }
}

impl core::fmt::Display for FieldError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.field.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.field.join("."), self.message)
        }
    }
}

/// Catalog call failure (transport or protocol).
///
/// Business outcomes like "no SKU" are not errors; they come back as `Ok`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected HTTP status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("graphql errors: {}", .0.join("; "))]
    GraphQl(Vec<String>),

    #[error("malformed catalog response: {0}")]
    Malformed(String),
}

impl CatalogError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}

/// Query/mutation surface of the commerce catalog.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// SKU of one inventory record. `None` when the record has no SKU or
    /// does not exist.
    async fn resolve_sku(&self, item_id: &InventoryItemId) -> Result<Option<String>, CatalogError>;

    /// Catalog entries whose SKU matches `sku`, at most `limit` of them.
    async fn find_siblings(&self, sku: &Sku, limit: usize) -> Result<Vec<CatalogItem>, CatalogError>;

    /// Write `quantities` at `location_id` in one bulk call. Returns the
    /// field-level rejections; an empty vector means everything applied.
    async fn set_quantities(
        &self,
        location_id: &LocationId,
        quantities: &[ItemQuantity],
        options: &SetQuantitiesOptions,
    ) -> Result<Vec<FieldError>, CatalogError>;
}
