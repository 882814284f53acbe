//! In-memory broker for single-node deployments and tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::debug;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::{Delivery, MessageBroker};

use crate::topology::Topology;

#[derive(Debug, Clone)]
struct Stored {
    payload: Bytes,
    redelivered: bool,
}

#[derive(Debug, Default)]
struct State {
    queues: HashMap<String, VecDeque<Stored>>,
    unacked: HashMap<u64, (String, Bytes)>,
}

/// Broker whose queues live in process memory.
///
/// Unacked deliveries are held aside until acked or nacked; a nack puts the
/// message back at the head of its queue.
#[derive(Debug)]
pub struct MemoryBroker {
    topology: Topology,
    state: Mutex<State>,
    notify: Notify,
    next_tag: AtomicU64,
}

impl MemoryBroker {
    /// Create a broker routing by `topology`.
    pub fn new(topology: Topology) -> Self {
        Self {
            topology,
            state: Mutex::new(State::default()),
            notify: Notify::new(),
            next_tag: AtomicU64::new(1),
        }
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| AppError::broker("Broker state lock poisoned"))
    }

    /// Put a message straight onto `queue`, bypassing the exchange.
    pub fn enqueue(&self, queue: &str, payload: impl Into<Bytes>) -> AppResult<()> {
        self.lock()?
            .queues
            .entry(queue.to_string())
            .or_default()
            .push_back(Stored {
                payload: payload.into(),
                redelivered: false,
            });
        self.notify.notify_waiters();
        Ok(())
    }

    /// Number of messages waiting on `queue`, excluding unacked ones.
    pub fn pending(&self, queue: &str) -> AppResult<usize> {
        Ok(self.lock()?.queues.get(queue).map_or(0, VecDeque::len))
    }

    /// Number of deliveries handed out but not yet acked or nacked.
    pub fn in_flight(&self) -> AppResult<usize> {
        Ok(self.lock()?.unacked.len())
    }

    /// Remove and return every message waiting on `queue`.
    pub fn drain(&self, queue: &str) -> AppResult<Vec<Bytes>> {
        Ok(self
            .lock()?
            .queues
            .get_mut(queue)
            .map(|q| q.drain(..).map(|m| m.payload).collect())
            .unwrap_or_default())
    }

    fn try_take(&self, queue: &str) -> AppResult<Option<Delivery>> {
        let mut state = self.lock()?;
        let Some(message) = state.queues.get_mut(queue).and_then(VecDeque::pop_front) else {
            return Ok(None);
        };
        let tag = self.next_tag.fetch_add(1, Ordering::Relaxed);
        state
            .unacked
            .insert(tag, (queue.to_string(), message.payload.clone()));
        Ok(Some(Delivery {
            queue: queue.to_string(),
            payload: message.payload,
            tag,
            redelivered: message.redelivered,
        }))
    }
}

#[async_trait]
impl MessageBroker for MemoryBroker {
    async fn publish(&self, exchange: &str, routing_key: &str, payload: Bytes) -> AppResult<()> {
        let queues = self.topology.route(exchange, routing_key)?;
        {
            let mut state = self.lock()?;
            for queue in queues {
                state
                    .queues
                    .entry(queue.clone())
                    .or_default()
                    .push_back(Stored {
                        payload: payload.clone(),
                        redelivered: false,
                    });
            }
        }
        debug!(exchange, routing_key, queues = ?queues, "Message published");
        self.notify.notify_waiters();
        Ok(())
    }

    async fn receive(&self, queue: &str, timeout: Duration) -> AppResult<Option<Delivery>> {
        let deadline = Instant::now() + timeout;
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(delivery) = self.try_take(queue)? {
                return Ok(Some(delivery));
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Ok(None);
            }
        }
    }

    async fn ack(&self, delivery: &Delivery) -> AppResult<()> {
        self.lock()?.unacked.remove(&delivery.tag);
        Ok(())
    }

    async fn nack(&self, delivery: &Delivery) -> AppResult<()> {
        {
            let mut state = self.lock()?;
            let Some((queue, payload)) = state.unacked.remove(&delivery.tag) else {
                return Ok(());
            };
            state.queues.entry(queue).or_default().push_front(Stored {
                payload,
                redelivered: true,
            });
        }
        self.notify.notify_waiters();
        Ok(())
    }
}
