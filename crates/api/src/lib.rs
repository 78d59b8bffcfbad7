//! HTTP API: webhook intake, signature verification, and service wiring.

pub mod app;
pub mod context;
pub mod middleware;
pub mod signature;
