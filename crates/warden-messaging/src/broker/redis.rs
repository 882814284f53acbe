//! Broker backed by Redis lists, for deployments with several instances.
//!
//! Each queue is a list. Publishing pushes onto the left of every bound list
//! in one atomic pipeline; receiving moves the rightmost element onto the
//! queue's processing list, where it stays until acked. A nack moves it back
//! to the consuming end of the queue.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use redis::aio::ConnectionManager;
use redis::{Client, RedisError};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use warden_core::config::BrokerConfig;
use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_core::traits::{Delivery, MessageBroker};

use crate::topology::Topology;

/// Delay between polls of an empty queue.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Redis list broker.
#[derive(Clone)]
pub struct RedisBroker {
    conn: ConnectionManager,
    topology: Topology,
    processing_suffix: String,
}

impl std::fmt::Debug for RedisBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBroker")
            .field("topology", &self.topology)
            .finish()
    }
}

impl RedisBroker {
    /// Connect to Redis and route by `topology`.
    pub async fn connect(config: &BrokerConfig, topology: Topology) -> AppResult<Self> {
        let client = Client::open(config.redis_url.as_str()).map_err(|e| {
            AppError::with_source(ErrorKind::Broker, "Failed to create Redis client", e)
        })?;
        let conn = ConnectionManager::new(client).await.map_err(|e| {
            AppError::with_source(ErrorKind::Broker, "Failed to connect to Redis broker", e)
        })?;
        info!(exchange = topology.exchange(), "Connected to Redis broker");

        Ok(Self {
            conn,
            topology,
            processing_suffix: config.processing_suffix.clone(),
        })
    }

    fn processing_list(&self, queue: &str) -> String {
        format!("{queue}{}", self.processing_suffix)
    }

    fn map_err(e: RedisError) -> AppError {
        AppError::with_source(ErrorKind::Broker, format!("Redis broker error: {e}"), e)
    }

    /// Return deliveries left in flight by a previous process to `queue`.
    ///
    /// Call once before consuming; returns how many messages were restored.
    pub async fn recover(&self, queue: &str) -> AppResult<u64> {
        let processing = self.processing_list(queue);
        let mut conn = self.conn.clone();
        let mut restored = 0u64;
        loop {
            let moved: Option<Vec<u8>> = redis::cmd("LMOVE")
                .arg(&processing)
                .arg(queue)
                .arg("LEFT")
                .arg("RIGHT")
                .query_async(&mut conn)
                .await
                .map_err(Self::map_err)?;
            if moved.is_none() {
                break;
            }
            restored += 1;
        }
        if restored > 0 {
            warn!(queue, restored, "Restored unacked deliveries");
        }
        Ok(restored)
    }
}

#[async_trait]
impl MessageBroker for RedisBroker {
    async fn publish(&self, exchange: &str, routing_key: &str, payload: Bytes) -> AppResult<()> {
        let queues = self.topology.route(exchange, routing_key)?;
        let mut pipe = redis::pipe();
        pipe.atomic();
        for queue in queues {
            pipe.cmd("LPUSH").arg(queue).arg(payload.as_ref()).ignore();
        }
        let mut conn = self.conn.clone();
        pipe.query_async::<()>(&mut conn)
            .await
            .map_err(Self::map_err)?;
        debug!(exchange, routing_key, queues = ?queues, "Message published");
        Ok(())
    }

    async fn receive(&self, queue: &str, timeout: Duration) -> AppResult<Option<Delivery>> {
        let processing = self.processing_list(queue);
        let deadline = Instant::now() + timeout;
        let mut conn = self.conn.clone();
        loop {
            let moved: Option<Vec<u8>> = redis::cmd("LMOVE")
                .arg(queue)
                .arg(&processing)
                .arg("RIGHT")
                .arg("LEFT")
                .query_async(&mut conn)
                .await
                .map_err(Self::map_err)?;
            if let Some(payload) = moved {
                return Ok(Some(Delivery {
                    queue: queue.to_string(),
                    payload: Bytes::from(payload),
                    tag: 0,
                    redelivered: false,
                }));
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(POLL_INTERVAL.min(deadline - now)).await;
        }
    }

    async fn ack(&self, delivery: &Delivery) -> AppResult<()> {
        let processing = self.processing_list(&delivery.queue);
        let mut conn = self.conn.clone();
        redis::cmd("LREM")
            .arg(&processing)
            .arg(1)
            .arg(delivery.payload.as_ref())
            .query_async::<i64>(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn nack(&self, delivery: &Delivery) -> AppResult<()> {
        let processing = self.processing_list(&delivery.queue);
        let mut conn = self.conn.clone();
        redis::pipe()
            .atomic()
            .cmd("LREM")
            .arg(&processing)
            .arg(1)
            .arg(delivery.payload.as_ref())
            .ignore()
            .cmd("RPUSH")
            .arg(&delivery.queue)
            .arg(delivery.payload.as_ref())
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }
}
