//! Message broker backends.

pub mod memory;
#[cfg(feature = "redis-broker")]
pub mod redis;

use std::sync::Arc;

use tracing::info;

use warden_core::config::BrokerConfig;
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::MessageBroker;

use crate::topology::Topology;

pub use memory::MemoryBroker;
#[cfg(feature = "redis-broker")]
pub use redis::RedisBroker;

/// Create the broker selected by configuration.
pub async fn from_config(config: &BrokerConfig) -> AppResult<Arc<dyn MessageBroker>> {
    let topology = Topology::from_config(config);
    match config.backend.as_str() {
        #[cfg(feature = "redis-broker")]
        "redis" => {
            info!("Initializing Redis message broker");
            let broker = RedisBroker::connect(config, topology).await?;
            broker.recover(&config.auth_queue).await?;
            Ok(Arc::new(broker))
        }
        "memory" => {
            info!("Initializing in-memory message broker");
            Ok(Arc::new(MemoryBroker::new(topology)))
        }
        other => Err(AppError::configuration(format!(
            "Unknown broker backend: '{other}'. Supported: memory, redis"
        ))),
    }
}
