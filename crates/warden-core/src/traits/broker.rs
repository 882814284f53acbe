//! Message broker trait.
//!
//! Delivery is at-least-once: a message received but never acked is
//! delivered again, and nothing orders queues across producers.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// One message handed to a consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Queue the message was taken from.
    pub queue: String,
    /// Raw message body.
    pub payload: Bytes,
    /// Broker-specific handle used to ack or nack this delivery.
    pub tag: u64,
    /// Whether the broker has handed this message out before.
    pub redelivered: bool,
}

/// A topic-exchange style broker.
#[async_trait]
pub trait MessageBroker: Send + Sync + std::fmt::Debug + 'static {
    /// Hand a message to every queue bound to `routing_key` on `exchange`.
    ///
    /// Returns only once the broker has taken ownership of the message.
    /// Publishing to a key with no bound queue is an error.
    async fn publish(&self, exchange: &str, routing_key: &str, payload: Bytes) -> AppResult<()>;

    /// Wait up to `timeout` for the next message on `queue`.
    async fn receive(&self, queue: &str, timeout: Duration) -> AppResult<Option<Delivery>>;

    /// Confirm a delivery was processed; it will not be delivered again.
    async fn ack(&self, delivery: &Delivery) -> AppResult<()>;

    /// Return a delivery to its queue for redelivery.
    async fn nack(&self, delivery: &Delivery) -> AppResult<()>;
}
