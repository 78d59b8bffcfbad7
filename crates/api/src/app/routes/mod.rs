pub mod system;
pub mod webhooks;
