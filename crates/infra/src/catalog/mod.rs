//! Catalog adapters implementing [`skusync_inventory::CatalogApi`].

pub mod graphql;
pub mod in_memory;
pub mod shopify;

pub use in_memory::{CatalogCall, CatalogOp, InMemoryCatalog};
pub use shopify::ShopifyCatalog;
