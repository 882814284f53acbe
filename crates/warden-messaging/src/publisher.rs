//! Outbound lifecycle event publisher.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use warden_core::config::BrokerConfig;
use warden_core::error::{AppError, ErrorKind};
use warden_core::events::UserRegistered;
use warden_core::result::AppResult;
use warden_core::traits::MessageBroker;

use crate::codec;

/// Hands lifecycle events to the broker.
///
/// A publish returns only after the broker has accepted the message or the
/// configured timeout has passed. Every failure surfaces as
/// `ErrorKind::Publish`.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    broker: Arc<dyn MessageBroker>,
    exchange: String,
    registered_routing_key: String,
    timeout: Duration,
}

impl EventPublisher {
    /// Creates a new publisher.
    pub fn new(broker: Arc<dyn MessageBroker>, config: &BrokerConfig) -> Self {
        Self {
            broker,
            exchange: config.exchange.clone(),
            registered_routing_key: config.registered_routing_key.clone(),
            timeout: Duration::from_millis(config.publish_timeout_ms),
        }
    }

    /// Publish a `user.registered` event.
    pub async fn publish_user_registered(&self, event: &UserRegistered) -> AppResult<()> {
        let payload = codec::encode_user_registered(event)
            .map_err(|e| AppError::with_source(ErrorKind::Publish, "Failed to encode event", e))?;

        let outcome = tokio::time::timeout(
            self.timeout,
            self.broker
                .publish(&self.exchange, &self.registered_routing_key, payload),
        )
        .await;

        match outcome {
            Ok(Ok(())) => {
                info!(
                    user_id = %event.user_id,
                    event_id = %event.event_id,
                    routing_key = %self.registered_routing_key,
                    "Published user.registered"
                );
                Ok(())
            }
            Ok(Err(e)) => {
                error!(user_id = %event.user_id, error = %e, "Failed to publish user.registered");
                Err(AppError::with_source(
                    ErrorKind::Publish,
                    "Failed to publish user.registered event",
                    e,
                ))
            }
            Err(_) => {
                error!(
                    user_id = %event.user_id,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Timed out publishing user.registered"
                );
                Err(AppError::publish("Timed out publishing user.registered event"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use warden_core::traits::Delivery;
    use warden_core::types::id::UserId;

    use crate::broker::MemoryBroker;
    use crate::topology::Topology;

    #[derive(Debug)]
    struct StalledBroker;

    #[async_trait]
    impl MessageBroker for StalledBroker {
        async fn publish(&self, _: &str, _: &str, _: Bytes) -> AppResult<()> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
        async fn receive(&self, _: &str, _: Duration) -> AppResult<Option<Delivery>> {
            Ok(None)
        }
        async fn ack(&self, _: &Delivery) -> AppResult<()> {
            Ok(())
        }
        async fn nack(&self, _: &Delivery) -> AppResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_publish_lands_on_user_queue() {
        let config = BrokerConfig::default();
        let broker = Arc::new(MemoryBroker::new(Topology::from_config(&config)));
        let publisher = EventPublisher::new(broker.clone(), &config);

        let event = UserRegistered::new(UserId::new(), "alice");
        publisher.publish_user_registered(&event).await.unwrap();

        let messages = broker.drain("user.queue").unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(codec::decode_user_registered(&messages[0]).unwrap(), event);
    }

    #[tokio::test]
    async fn test_broker_rejection_is_publish_error() {
        let config = BrokerConfig::default();
        let broker = Arc::new(MemoryBroker::new(Topology::new("elsewhere")));
        let publisher = EventPublisher::new(broker, &config);

        let err = publisher
            .publish_user_registered(&UserRegistered::new(UserId::new(), "alice"))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Publish));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_broker_times_out() {
        let config = BrokerConfig {
            publish_timeout_ms: 50,
            ..BrokerConfig::default()
        };
        let publisher = EventPublisher::new(Arc::new(StalledBroker), &config);

        let err = publisher
            .publish_user_registered(&UserRegistered::new(UserId::new(), "alice"))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Publish));
    }
}
