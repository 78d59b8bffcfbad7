//! Checkpoint sink for reconciliation runs.
//!
//! The orchestrator reports progress here instead of logging directly, so the
//! same run can feed structured logs in production and assertions in tests.

use std::sync::{Mutex, PoisonError};

use skusync_core::{InventoryItemId, LocationId, RunId};
use skusync_events::ChangeEvent;

use crate::catalog::FieldError;
use crate::orchestrator::{SkipReason, Step};
use crate::sku::Sku;

/// One checkpoint of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationEvent {
    /// The payload normalized into a change event.
    Received { run_id: RunId, event: ChangeEvent },

    Skipped { run_id: RunId, reason: SkipReason },

    SkuResolved {
        run_id: RunId,
        item_id: InventoryItemId,
        sku: Sku,
    },

    SiblingsFound {
        run_id: RunId,
        sku: Sku,
        count: usize,
        dropped: usize,
        /// A full page came back; siblings past the page size were not touched.
        truncated: bool,
    },

    Committed {
        run_id: RunId,
        sku: Sku,
        location_id: LocationId,
        quantity: i64,
        assignments: usize,
        rejected: usize,
    },

    /// Subset of the bulk write rejected by the catalog.
    FieldErrors {
        run_id: RunId,
        sku: Sku,
        errors: Vec<FieldError>,
    },

    Failed {
        run_id: RunId,
        step: Step,
        error: String,
    },
}

impl ReconciliationEvent {
    pub fn run_id(&self) -> RunId {
        match self {
            ReconciliationEvent::Received { run_id, .. }
            | ReconciliationEvent::Skipped { run_id, .. }
            | ReconciliationEvent::SkuResolved { run_id, .. }
            | ReconciliationEvent::SiblingsFound { run_id, .. }
            | ReconciliationEvent::Committed { run_id, .. }
            | ReconciliationEvent::FieldErrors { run_id, .. }
            | ReconciliationEvent::Failed { run_id, .. } => *run_id,
        }
    }
}

/// Sink for reconciliation checkpoints.
pub trait ReconciliationObserver: Send + Sync + 'static {
    fn emit(&self, event: ReconciliationEvent);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ReconciliationObserver for NoopObserver {
    fn emit(&self, _event: ReconciliationEvent) {}
}

/// In-memory sink for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryObserver {
    inner: Mutex<Vec<ReconciliationEvent>>,
}

impl InMemoryObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<ReconciliationEvent> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ReconciliationObserver for InMemoryObserver {
    fn emit(&self, event: ReconciliationEvent) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
