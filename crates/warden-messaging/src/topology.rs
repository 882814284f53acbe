//! Exchange bindings: which queues receive a message published with a
//! given routing key.

use std::collections::HashMap;

use warden_core::config::BrokerConfig;
use warden_core::error::AppError;
use warden_core::result::AppResult;

/// Routing table of one topic exchange.
#[derive(Debug, Clone)]
pub struct Topology {
    exchange: String,
    routes: HashMap<String, Vec<String>>,
}

impl Topology {
    /// An exchange with no bindings.
    pub fn new(exchange: impl Into<String>) -> Self {
        Self {
            exchange: exchange.into(),
            routes: HashMap::new(),
        }
    }

    /// Build the routing table described by the broker configuration.
    pub fn from_config(config: &BrokerConfig) -> Self {
        let mut topology = Self::new(config.exchange.clone());
        let mut keys: Vec<&String> = config.bindings.keys().collect();
        keys.push(&config.registered_routing_key);
        for key in keys {
            for queue in config.queues_for(key) {
                topology = topology.bind(key.clone(), queue);
            }
        }
        topology
    }

    /// Bind `queue` to `routing_key`.
    pub fn bind(mut self, routing_key: impl Into<String>, queue: impl Into<String>) -> Self {
        let queue = queue.into();
        let queues = self.routes.entry(routing_key.into()).or_default();
        if !queues.contains(&queue) {
            queues.push(queue);
        }
        self
    }

    /// Exchange name.
    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    /// Queues bound to `routing_key` on `exchange`.
    ///
    /// An unknown exchange or a key without bindings is an error, so a
    /// publish can never be silently dropped.
    pub fn route(&self, exchange: &str, routing_key: &str) -> AppResult<&[String]> {
        if exchange != self.exchange {
            return Err(AppError::broker(format!("Unknown exchange '{exchange}'")));
        }
        match self.routes.get(routing_key) {
            Some(queues) if !queues.is_empty() => Ok(queues),
            _ => Err(AppError::broker(format!(
                "No queue bound to routing key '{routing_key}' on exchange '{exchange}'"
            ))),
        }
    }
}
