//! Same-SKU inventory reconciliation.
//!
//! When one inventory record changes, every other record sharing its SKU is
//! set to the same quantity at the same location. This crate is the
//! deterministic core of that flow; the catalog it talks to is injected
//! through [`CatalogApi`].

pub mod catalog;
pub mod guard;
pub mod observer;
pub mod orchestrator;
pub mod reconcile;
pub mod siblings;
pub mod sku;

pub use catalog::{
    CatalogApi, CatalogError, CatalogItem, FieldError, ItemQuantity, SetQuantitiesOptions,
};
pub use guard::{EchoGuard, NoEchoGuard, RecentCommitGuard};
pub use observer::{InMemoryObserver, NoopObserver, ReconciliationEvent, ReconciliationObserver};
pub use orchestrator::{FailureCause, Orchestrator, RunFailure, RunOutcome, SkipReason, Step};
pub use reconcile::{AssignmentBatch, CommitReport, QuantityAssignment};
pub use siblings::{SiblingLookup, SiblingSet, SIBLING_PAGE_SIZE};
pub use sku::Sku;
