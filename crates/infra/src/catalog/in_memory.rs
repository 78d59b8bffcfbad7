use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};

use async_trait::async_trait;

use skusync_core::{InventoryItemId, LocationId};
use skusync_inventory::{
    CatalogApi, CatalogError, CatalogItem, FieldError, ItemQuantity, SetQuantitiesOptions, Sku,
};

/// Catalog operation, for fault injection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CatalogOp {
    ResolveSku,
    FindSiblings,
    SetQuantities,
}

/// A call as received by [`InMemoryCatalog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogCall {
    ResolveSku(InventoryItemId),
    FindSiblings {
        sku: String,
        limit: usize,
    },
    SetQuantities {
        location_id: LocationId,
        quantities: Vec<ItemQuantity>,
        options: SetQuantitiesOptions,
    },
}

impl CatalogCall {
    pub fn op(&self) -> CatalogOp {
        match self {
            CatalogCall::ResolveSku(_) => CatalogOp::ResolveSku,
            CatalogCall::FindSiblings { .. } => CatalogOp::FindSiblings,
            CatalogCall::SetQuantities { .. } => CatalogOp::SetQuantities,
        }
    }
}

#[derive(Debug, Default)]
struct CatalogState {
    /// Inventory records and their SKU.
    items: HashMap<InventoryItemId, Option<String>>,
    /// Variants in listing order.
    variants: Vec<CatalogItem>,
    levels: HashMap<(InventoryItemId, LocationId), i64>,
}

/// In-memory catalog.
///
/// Intended for tests/dev. Records every call, supports injected faults and
/// field-level rejections, and applies quantity writes to its own levels.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    state: RwLock<CatalogState>,
    calls: Mutex<Vec<CatalogCall>>,
    faults: Mutex<HashMap<CatalogOp, CatalogError>>,
    /// Indexes into the next `set_quantities` batch to reject.
    rejections: Mutex<Vec<(usize, String)>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an inventory record with its variant listing entry.
    pub fn with_item(self, item_id: InventoryItemId, sku: Option<&str>) -> Self {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.items.insert(item_id.clone(), sku.map(str::to_string));
            state.variants.push(CatalogItem {
                item_id: Some(item_id),
                sku: sku.map(str::to_string),
            });
        }
        self
    }

    /// Add an inventory record that no variant listing points at (SKU search
    /// will not find it).
    pub fn with_unlisted_item(self, item_id: InventoryItemId, sku: &str) -> Self {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .items
            .insert(item_id, Some(sku.to_string()));
        self
    }

    /// Add a variant listing entry without a resolvable inventory record.
    pub fn with_unlinked_variant(self, sku: &str) -> Self {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .variants
            .push(CatalogItem {
                item_id: None,
                sku: Some(sku.to_string()),
            });
        self
    }

    pub fn with_level(self, item_id: InventoryItemId, location_id: LocationId, quantity: i64) -> Self {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .levels
            .insert((item_id, location_id), quantity);
        self
    }

    /// Make every call of `op` fail with `error` until cleared.
    pub fn fail_on(&self, op: CatalogOp, error: CatalogError) {
        self.faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(op, error);
    }

    pub fn clear_faults(&self) {
        self.faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Reject entry `index` of the next quantity write with `message`.
    pub fn reject_next(&self, index: usize, message: impl Into<String>) {
        self.rejections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((index, message.into()));
    }

    pub fn level(&self, item_id: &InventoryItemId, location_id: &LocationId) -> Option<i64> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .levels
            .get(&(item_id.clone(), location_id.clone()))
            .copied()
    }

    pub fn calls(&self) -> Vec<CatalogCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self, op: CatalogOp) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|c| c.op() == op)
            .count()
    }

    fn enter(&self, call: CatalogCall) -> Result<(), CatalogError> {
        let op = call.op();
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);

        match self
            .faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&op)
        {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CatalogApi for InMemoryCatalog {
    async fn resolve_sku(&self, item_id: &InventoryItemId) -> Result<Option<String>, CatalogError> {
        self.enter(CatalogCall::ResolveSku(item_id.clone()))?;

        let state = self
            .state
            .read()
            .map_err(|_| CatalogError::transport("lock poisoned"))?;
        Ok(state.items.get(item_id).cloned().flatten())
    }

    async fn find_siblings(&self, sku: &Sku, limit: usize) -> Result<Vec<CatalogItem>, CatalogError> {
        self.enter(CatalogCall::FindSiblings {
            sku: sku.as_str().to_string(),
            limit,
        })?;

        let state = self
            .state
            .read()
            .map_err(|_| CatalogError::transport("lock poisoned"))?;
        Ok(state
            .variants
            .iter()
            .filter(|v| v.sku.as_deref() == Some(sku.as_str()))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn set_quantities(
        &self,
        location_id: &LocationId,
        quantities: &[ItemQuantity],
        options: &SetQuantitiesOptions,
    ) -> Result<Vec<FieldError>, CatalogError> {
        self.enter(CatalogCall::SetQuantities {
            location_id: location_id.clone(),
            quantities: quantities.to_vec(),
            options: options.clone(),
        })?;

        let rejections: Vec<(usize, String)> = self
            .rejections
            .lock()
            .map_err(|_| CatalogError::transport("lock poisoned"))?
            .drain(..)
            .collect();

        let mut state = self
            .state
            .write()
            .map_err(|_| CatalogError::transport("lock poisoned"))?;

        let mut errors = Vec::new();
        for (idx, q) in quantities.iter().enumerate() {
            if let Some((_, message)) = rejections.iter().find(|(i, _)| *i == idx) {
                errors.push(FieldError::new(
                    vec![
                        "input".to_string(),
                        "quantities".to_string(),
                        idx.to_string(),
                        "inventoryItemId".to_string(),
                    ],
                    message.clone(),
                ));
                continue;
            }
            state
                .levels
                .insert((q.item_id.clone(), location_id.clone()), q.quantity);
        }

        Ok(errors)
    }
}
