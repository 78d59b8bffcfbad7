//! Quantity reconciler: mirror one observed quantity onto every sibling.

use serde::{Deserialize, Serialize};

use skusync_core::{InventoryItemId, LocationId};

use crate::catalog::{CatalogApi, CatalogError, FieldError, ItemQuantity, SetQuantitiesOptions};
use crate::siblings::SiblingSet;

/// Target quantity of one record at one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityAssignment {
    pub item_id: InventoryItemId,
    pub location_id: LocationId,
    pub quantity: i64,
}

/// The bulk write of one reconciliation run.
///
/// Never empty. Every assignment carries the batch's location and quantity;
/// the fields are private so that cannot drift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentBatch {
    location_id: LocationId,
    quantity: i64,
    assignments: Vec<QuantityAssignment>,
}

impl AssignmentBatch {
    /// One assignment per sibling, the trigger record included.
    ///
    /// `None` when there is no sibling to write to.
    pub fn build(siblings: &SiblingSet, location_id: &LocationId, quantity: i64) -> Option<Self> {
        if siblings.is_empty() {
            return None;
        }

        let assignments = siblings
            .item_ids()
            .iter()
            .map(|item_id| QuantityAssignment {
                item_id: item_id.clone(),
                location_id: location_id.clone(),
                quantity,
            })
            .collect();

        Some(Self {
            location_id: location_id.clone(),
            quantity,
            assignments,
        })
    }

    pub fn location_id(&self) -> &LocationId {
        &self.location_id
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn assignments(&self) -> &[QuantityAssignment] {
        &self.assignments
    }

    fn item_quantities(&self) -> Vec<ItemQuantity> {
        self.assignments
            .iter()
            .map(|a| ItemQuantity {
                item_id: a.item_id.clone(),
                quantity: a.quantity,
            })
            .collect()
    }
}

/// What the catalog did with a committed batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReport {
    pub assignments: Vec<QuantityAssignment>,
    pub field_errors: Vec<FieldError>,
}

impl CommitReport {
    pub fn is_clean(&self) -> bool {
        self.field_errors.is_empty()
    }

    /// Assignments not pointed at by any field error.
    ///
    /// A field error that cannot be tied to a specific entry taints nothing;
    /// the catalog reports those for request-level problems.
    pub fn applied(&self) -> Vec<&QuantityAssignment> {
        let rejected: Vec<usize> = self
            .field_errors
            .iter()
            .filter_map(FieldError::quantity_index)
            .collect();
        self.assignments
            .iter()
            .enumerate()
            .filter(|(i, _)| !rejected.contains(i))
            .map(|(_, a)| a)
            .collect()
    }
}

/// Submit `batch` as a single bulk write.
///
/// Field-level rejections do not fail the call; they are part of the report
/// and nothing is retried or rolled back.
pub async fn commit(
    catalog: &dyn CatalogApi,
    batch: &AssignmentBatch,
    options: &SetQuantitiesOptions,
) -> Result<CommitReport, CatalogError> {
    let field_errors = catalog
        .set_quantities(batch.location_id(), &batch.item_quantities(), options)
        .await?;

    Ok(CommitReport {
        assignments: batch.assignments.clone(),
        field_errors,
    })
}
