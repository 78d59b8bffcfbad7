//! Inbound change notifications: webhook envelope, topics, and the
//! normalizer that turns an untyped payload into a [`ChangeEvent`].

pub mod envelope;
pub mod event;
pub mod normalize;
pub mod topic;

pub use envelope::WebhookEnvelope;
pub use event::ChangeEvent;
pub use normalize::{normalize, Normalized, RejectReason};
pub use topic::Topic;
