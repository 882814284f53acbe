//! Deletion-request consumer loop.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::time;
use tracing::{debug, error, info, warn};

use warden_core::config::BrokerConfig;
use warden_core::events::DeletionRequest;
use warden_core::result::AppResult;
use warden_core::traits::{Delivery, MessageBroker};

use crate::codec;

/// Pause after a broker or handler failure before polling again.
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Floor on the receive timeout so an idle loop never spins.
const MIN_POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Applies one deletion request. Must be idempotent: a request for a user
/// that no longer exists succeeds without doing anything.
#[async_trait]
pub trait DeletionHandler: Send + Sync + std::fmt::Debug + 'static {
    /// Remove the requested user if present.
    async fn handle(&self, request: &DeletionRequest) -> AppResult<()>;
}

/// What one poll of the queue did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Nothing arrived within the poll timeout.
    Idle,
    /// A request was applied and acked.
    Applied,
    /// An undecodable message was acked and dropped.
    Rejected,
    /// Handling failed on infrastructure; the message was nacked.
    Requeued,
}

/// Long-lived listener applying deletion requests from the auth queue.
#[derive(Debug)]
pub struct DeletionConsumer {
    broker: Arc<dyn MessageBroker>,
    handler: Arc<dyn DeletionHandler>,
    queue: String,
    poll_timeout: Duration,
}

impl DeletionConsumer {
    /// Creates a new consumer for the configured auth queue.
    pub fn new(
        broker: Arc<dyn MessageBroker>,
        handler: Arc<dyn DeletionHandler>,
        config: &BrokerConfig,
    ) -> Self {
        Self {
            broker,
            handler,
            queue: config.auth_queue.clone(),
            poll_timeout: Duration::from_secs(config.consumer_poll_timeout_seconds)
                .max(MIN_POLL_TIMEOUT),
        }
    }

    /// Run until the cancel signal turns true or its sender is dropped.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        info!(queue = %self.queue, "Deletion consumer started");

        loop {
            tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        break;
                    }
                }
                outcome = self.poll_once() => {
                    let backoff = match outcome {
                        Ok(PollOutcome::Requeued) => true,
                        Ok(_) => false,
                        Err(e) => {
                            error!(queue = %self.queue, error = %e, "Failed to receive from queue");
                            true
                        }
                    };
                    if backoff {
                        tokio::select! {
                            changed = cancel.changed() => {
                                if changed.is_err() || *cancel.borrow() {
                                    break;
                                }
                            }
                            _ = time::sleep(RETRY_DELAY) => {}
                        }
                    }
                }
            }
        }

        info!(queue = %self.queue, "Deletion consumer stopped");
    }

    /// Wait for one delivery and process it.
    pub async fn poll_once(&self) -> AppResult<PollOutcome> {
        match self.broker.receive(&self.queue, self.poll_timeout).await? {
            Some(delivery) => self.process(&delivery).await,
            None => Ok(PollOutcome::Idle),
        }
    }

    async fn process(&self, delivery: &Delivery) -> AppResult<PollOutcome> {
        let request = match codec::decode_deletion_request(&delivery.payload) {
            Ok(request) => request,
            Err(e) => {
                warn!(
                    queue = %self.queue,
                    error = %e,
                    "Dropping undecodable deletion request"
                );
                self.broker.ack(delivery).await?;
                return Ok(PollOutcome::Rejected);
            }
        };

        match self.handler.handle(&request).await {
            Ok(()) => {
                debug!(user_id = %request.user_id, redelivered = delivery.redelivered, "Deletion request applied");
                self.broker.ack(delivery).await?;
                Ok(PollOutcome::Applied)
            }
            Err(e) if e.kind.is_infrastructure() => {
                warn!(user_id = %request.user_id, error = %e, "Deletion request failed, requeueing");
                self.broker.nack(delivery).await?;
                Ok(PollOutcome::Requeued)
            }
            Err(e) => {
                warn!(user_id = %request.user_id, error = %e, "Deletion request rejected");
                self.broker.ack(delivery).await?;
                Ok(PollOutcome::Rejected)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use warden_core::error::AppError;

    use crate::broker::MemoryBroker;
    use crate::topology::Topology;

    #[derive(Debug, Default)]
    struct Recording {
        seen: Mutex<Vec<String>>,
        failures_left: AtomicUsize,
    }

    #[async_trait]
    impl DeletionHandler for Recording {
        async fn handle(&self, request: &DeletionRequest) -> AppResult<()> {
            if self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(AppError::database("connection reset"));
            }
            self.seen.lock().unwrap().push(request.user_id.clone());
            Ok(())
        }
    }

    fn setup(failures: usize) -> (Arc<MemoryBroker>, Arc<Recording>, DeletionConsumer) {
        let broker = Arc::new(MemoryBroker::new(Topology::new("app")));
        let handler = Arc::new(Recording {
            failures_left: AtomicUsize::new(failures),
            ..Recording::default()
        });
        let config = BrokerConfig {
            consumer_poll_timeout_seconds: 0,
            ..BrokerConfig::default()
        };
        let consumer = DeletionConsumer::new(broker.clone(), handler.clone(), &config);
        (broker, handler, consumer)
    }

    #[tokio::test]
    async fn test_applies_and_acks() {
        let (broker, handler, consumer) = setup(0);
        broker.enqueue("auth.queue", r#"{"userId":"u1"}"#).unwrap();

        assert_eq!(consumer.poll_once().await.unwrap(), PollOutcome::Applied);
        assert_eq!(*handler.seen.lock().unwrap(), vec!["u1"]);
        assert_eq!(broker.in_flight().unwrap(), 0);
        assert_eq!(consumer.poll_once().await.unwrap(), PollOutcome::Idle);
    }

    #[tokio::test]
    async fn test_poison_message_is_acked() {
        let (broker, handler, consumer) = setup(0);
        broker.enqueue("auth.queue", "").unwrap();

        assert_eq!(consumer.poll_once().await.unwrap(), PollOutcome::Rejected);
        assert!(handler.seen.lock().unwrap().is_empty());
        assert_eq!(broker.pending("auth.queue").unwrap(), 0);
        assert_eq!(broker.in_flight().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_infrastructure_failure_requeues_then_succeeds() {
        let (broker, handler, consumer) = setup(1);
        broker.enqueue("auth.queue", r#"{"userId":"u1"}"#).unwrap();

        assert_eq!(consumer.poll_once().await.unwrap(), PollOutcome::Requeued);
        assert_eq!(broker.pending("auth.queue").unwrap(), 1);
        assert_eq!(consumer.poll_once().await.unwrap(), PollOutcome::Applied);
        assert_eq!(*handler.seen.lock().unwrap(), vec!["u1"]);
    }

    #[tokio::test]
    async fn test_run_stops_on_cancel() {
        let (broker, handler, consumer) = setup(0);
        broker.enqueue("auth.queue", r#"{"userId":"u1"}"#).unwrap();
        broker.enqueue("auth.queue", r#"{"userId":"u1"}"#).unwrap();

        let (tx, rx) = watch::channel(false);
        let task = tokio::spawn(async move { consumer.run(rx).await });

        for _ in 0..100 {
            if handler.seen.lock().unwrap().len() == 2 {
                break;
            }
            time::sleep(Duration::from_millis(10)).await;
        }
        tx.send(true).unwrap();
        task.await.unwrap();

        assert_eq!(*handler.seen.lock().unwrap(), vec!["u1", "u1"]);
    }

    #[tokio::test]
    async fn test_run_stops_when_sender_dropped() {
        let (_broker, _handler, consumer) = setup(0);
        let (tx, rx) = watch::channel(false);
        let task = tokio::spawn(async move { consumer.run(rx).await });

        drop(tx);
        time::timeout(Duration::from_secs(2), task)
            .await
            .expect("consumer should stop once the sender is gone")
            .unwrap();
    }
}
