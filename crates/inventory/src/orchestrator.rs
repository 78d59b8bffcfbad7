//! Reconciliation orchestrator.
//!
//! One run per change event, strictly linear:
//!
//! ```text
//! Start -> Normalized -> SkuResolved -> SiblingsFound -> Committed
//!    \__________\______________\______________\_______-> Skipped
//! ```
//!
//! Every run ends in exactly one terminal outcome. Catalog failures become
//! [`RunOutcome::Failed`]; nothing is returned as an `Err` and nothing is
//! retried. Runs do not coordinate with each other: two runs for the same SKU
//! may interleave and the last commit wins.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use thiserror::Error;

use skusync_core::{InventoryItemId, RunId};
use skusync_events::{normalize, ChangeEvent, Normalized, RejectReason};

use crate::catalog::{CatalogApi, CatalogError, SetQuantitiesOptions};
use crate::guard::{EchoGuard, NoEchoGuard};
use crate::observer::{NoopObserver, ReconciliationEvent, ReconciliationObserver};
use crate::reconcile::{self, AssignmentBatch, CommitReport};
use crate::siblings;
use crate::sku::{self, Sku};

/// Catalog step a run was executing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    ResolveSku,
    FindSiblings,
    SetQuantities,
    /// The run died without reporting where (panic inside a collaborator).
    Unknown,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::ResolveSku => "resolve_sku",
            Step::FindSiblings => "find_siblings",
            Step::SetQuantities => "set_quantities",
            Step::Unknown => "unknown",
        }
    }
}

impl core::fmt::Display for Step {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected early exits. None of these is an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("unusable payload: {0}")]
    Rejected(RejectReason),

    #[error("echo of an earlier write")]
    EchoSuppressed,

    #[error("no SKU for inventory item {0}")]
    NoSku(InventoryItemId),

    #[error("no catalog entries for SKU {0}")]
    NoSiblings(Sku),

    #[error("{returned} catalog entries for SKU {sku}, none with a usable inventory item")]
    NoResolvableSiblings { sku: Sku, returned: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureCause {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("run panicked: {0}")]
    Panicked(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{step} failed: {cause}")]
pub struct RunFailure {
    pub step: Step,
    pub cause: FailureCause,
}

/// Terminal state of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Skipped(SkipReason),
    /// The bulk write went through; it may still carry field-level errors.
    Committed(CommitReport),
    Failed(RunFailure),
}

impl RunOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, RunOutcome::Committed(_))
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            RunOutcome::Skipped(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunOutcome::Skipped(_) => "skipped",
            RunOutcome::Committed(_) => "committed",
            RunOutcome::Failed(_) => "failed",
        }
    }
}

/// Same-SKU inventory reconciliation for one catalog.
///
/// The catalog capability is injected; the orchestrator holds no state of
/// its own besides the optional echo guard.
#[derive(Clone)]
pub struct Orchestrator {
    catalog: Arc<dyn CatalogApi>,
    observer: Arc<dyn ReconciliationObserver>,
    guard: Arc<dyn EchoGuard>,
    options: SetQuantitiesOptions,
}

impl core::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    pub fn new(catalog: Arc<dyn CatalogApi>) -> Self {
        Self {
            catalog,
            observer: Arc::new(NoopObserver),
            guard: Arc::new(NoEchoGuard),
            options: SetQuantitiesOptions::default(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ReconciliationObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_echo_guard(mut self, guard: Arc<dyn EchoGuard>) -> Self {
        self.guard = guard;
        self
    }

    pub fn with_options(mut self, options: SetQuantitiesOptions) -> Self {
        self.options = options;
        self
    }

    /// Normalize `payload` and reconcile it.
    pub async fn handle_payload(&self, payload: &JsonValue) -> RunOutcome {
        self.handle(RunId::new(), payload).await
    }

    /// Like [`Self::handle_payload`], but on a separate task so that a
    /// panicking collaborator still ends in [`RunOutcome::Failed`].
    pub async fn handle_isolated(self: Arc<Self>, payload: JsonValue) -> RunOutcome {
        let run_id = RunId::new();
        let this = Arc::clone(&self);
        let task = tokio::spawn(async move { this.handle(run_id, &payload).await });

        match task.await {
            Ok(outcome) => outcome,
            Err(join_err) => self.fail(
                run_id,
                Step::Unknown,
                FailureCause::Panicked(join_err.to_string()),
            ),
        }
    }

    /// Reconcile an already validated event.
    pub async fn reconcile(&self, event: &ChangeEvent) -> RunOutcome {
        self.run(RunId::new(), event).await
    }

    async fn handle(&self, run_id: RunId, payload: &JsonValue) -> RunOutcome {
        match normalize(payload) {
            Normalized::Valid(event) => self.run(run_id, &event).await,
            Normalized::Rejected(reason) => self.skip(run_id, SkipReason::Rejected(reason)),
        }
    }

    async fn run(&self, run_id: RunId, event: &ChangeEvent) -> RunOutcome {
        self.observer.emit(ReconciliationEvent::Received {
            run_id,
            event: event.clone(),
        });

        if self.guard.is_echo(event) {
            return self.skip(run_id, SkipReason::EchoSuppressed);
        }

        let catalog = self.catalog.as_ref();

        let sku = match sku::resolve_sku(catalog, event.item_id()).await {
            Ok(Some(sku)) => sku,
            Ok(None) => return self.skip(run_id, SkipReason::NoSku(event.item_id().clone())),
            Err(e) => return self.fail(run_id, Step::ResolveSku, e.into()),
        };
        self.observer.emit(ReconciliationEvent::SkuResolved {
            run_id,
            item_id: event.item_id().clone(),
            sku: sku.clone(),
        });

        let lookup = match siblings::locate_siblings(catalog, &sku).await {
            Ok(lookup) => lookup,
            Err(e) => return self.fail(run_id, Step::FindSiblings, e.into()),
        };
        if lookup.returned == 0 {
            return self.skip(run_id, SkipReason::NoSiblings(sku));
        }
        let Some(batch) =
            AssignmentBatch::build(&lookup.siblings, event.location_id(), event.new_quantity())
        else {
            return self.skip(
                run_id,
                SkipReason::NoResolvableSiblings {
                    sku,
                    returned: lookup.returned,
                },
            );
        };
        self.observer.emit(ReconciliationEvent::SiblingsFound {
            run_id,
            sku: sku.clone(),
            count: lookup.siblings.len(),
            dropped: lookup.dropped,
            truncated: lookup.truncated,
        });

        let report = match reconcile::commit(catalog, &batch, &self.options).await {
            Ok(report) => report,
            Err(e) => return self.fail(run_id, Step::SetQuantities, e.into()),
        };

        if !report.is_clean() {
            self.observer.emit(ReconciliationEvent::FieldErrors {
                run_id,
                sku: sku.clone(),
                errors: report.field_errors.clone(),
            });
        }
        self.guard.record(event, &report.applied());
        self.observer.emit(ReconciliationEvent::Committed {
            run_id,
            sku,
            location_id: batch.location_id().clone(),
            quantity: batch.quantity(),
            assignments: batch.assignments().len(),
            rejected: report.field_errors.len(),
        });

        RunOutcome::Committed(report)
    }

    fn skip(&self, run_id: RunId, reason: SkipReason) -> RunOutcome {
        self.observer.emit(ReconciliationEvent::Skipped {
            run_id,
            reason: reason.clone(),
        });
        RunOutcome::Skipped(reason)
    }

    fn fail(&self, run_id: RunId, step: Step, cause: FailureCause) -> RunOutcome {
        self.observer.emit(ReconciliationEvent::Failed {
            run_id,
            step,
            error: cause.to_string(),
        });
        RunOutcome::Failed(RunFailure { step, cause })
    }
}
