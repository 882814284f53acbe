//! # warden-messaging
//!
//! Cross-service messaging for Warden:
//!
//! - `broker`: topic-exchange brokers: in-memory for a single node, Redis
//!   lists for several
//! - `codec`: JSON wire format of lifecycle messages
//! - `publisher`: bounded hand-off of `user.registered` events
//! - `consumer`: the subscribe loop applying deletion requests
//!
//! Delivery is at-least-once in both directions.

pub mod broker;
pub mod codec;
pub mod consumer;
pub mod publisher;
pub mod topology;

pub use broker::MemoryBroker;
#[cfg(feature = "redis-broker")]
pub use broker::RedisBroker;
pub use consumer::{DeletionConsumer, DeletionHandler, PollOutcome};
pub use publisher::EventPublisher;
pub use topology::Topology;
