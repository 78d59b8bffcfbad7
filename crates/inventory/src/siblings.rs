//! Sibling locator: every inventory record sharing a SKU.

use std::collections::HashSet;

use skusync_core::InventoryItemId;

use crate::catalog::{CatalogApi, CatalogError, CatalogItem};
use crate::sku::Sku;

/// Upper bound of one sibling lookup. Larger groups are truncated; there is
/// no pagination.
pub const SIBLING_PAGE_SIZE: usize = 50;

/// Distinct inventory records sharing one SKU, in platform order.
///
/// Includes the record that triggered the lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SiblingSet {
    item_ids: Vec<InventoryItemId>,
}

impl SiblingSet {
    pub fn item_ids(&self) -> &[InventoryItemId] {
        &self.item_ids
    }

    pub fn len(&self) -> usize {
        self.item_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.item_ids.is_empty()
    }

    pub fn contains(&self, item_id: &InventoryItemId) -> bool {
        self.item_ids.contains(item_id)
    }
}

impl FromIterator<InventoryItemId> for SiblingSet {
    fn from_iter<I: IntoIterator<Item = InventoryItemId>>(iter: I) -> Self {
        let mut seen = HashSet::new();
        let item_ids = iter
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();
        Self { item_ids }
    }
}

/// Result of one sibling lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiblingLookup {
    pub siblings: SiblingSet,
    /// Entries the catalog returned at all (before filtering).
    pub returned: usize,
    /// Entries dropped for lacking an item id or carrying another SKU.
    pub dropped: usize,
    /// The page came back full, so more siblings may exist.
    pub truncated: bool,
}

/// Find all records sharing `sku` with one bounded catalog query.
pub async fn locate_siblings(
    catalog: &dyn CatalogApi,
    sku: &Sku,
) -> Result<SiblingLookup, CatalogError> {
    let entries = catalog.find_siblings(sku, SIBLING_PAGE_SIZE).await?;
    Ok(collect_siblings(sku, entries))
}

fn collect_siblings(sku: &Sku, entries: Vec<CatalogItem>) -> SiblingLookup {
    let returned = entries.len();
    let mut kept = 0usize;

    let siblings: SiblingSet = entries
        .into_iter()
        .filter(|e| e.sku.as_deref().is_none_or(|s| s == sku.as_str()))
        .filter_map(|e| e.item_id)
        .inspect(|_| kept += 1)
        .collect();

    SiblingLookup {
        siblings,
        returned,
        dropped: returned - kept,
        truncated: returned >= SIBLING_PAGE_SIZE,
    }
}
