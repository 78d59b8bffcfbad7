//! SKU resolver.

use serde::{Deserialize, Serialize};

use skusync_core::InventoryItemId;

use crate::catalog::{CatalogApi, CatalogError};

/// A non-blank SKU string, the join key between sibling variants.
///
/// The value is kept exactly as the catalog returned it (no trimming or case
/// folding); only blank values are refused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sku(String);

impl Sku {
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Sku {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Look up the SKU of `item_id` with exactly one catalog call.
///
/// `Ok(None)` is the normal "item has no SKU" outcome.
pub async fn resolve_sku(
    catalog: &dyn CatalogApi,
    item_id: &InventoryItemId,
) -> Result<Option<Sku>, CatalogError> {
    Ok(catalog.resolve_sku(item_id).await?.and_then(Sku::new))
}
