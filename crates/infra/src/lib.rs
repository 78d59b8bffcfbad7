//! Infrastructure layer: configuration and catalog adapters.

pub mod catalog;
pub mod config;

mod integration_tests;

pub use catalog::{InMemoryCatalog, ShopifyCatalog};
pub use config::{AppConfig, ConfigError, ShopConfig};
