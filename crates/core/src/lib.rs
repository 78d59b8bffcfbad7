//! `skusync-core`: shared identifiers and domain errors.
//!
//! This crate contains **pure** primitives (no IO): identifiers and the
//! domain error model used by every other crate in the workspace.

pub mod error;
pub mod id;

pub use error::DomainError;
pub use id::{InventoryItemId, LocationId, RunId, ShopDomain};
