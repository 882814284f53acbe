//! Message broker configuration.
//!
//! The broker is modelled as a topic exchange: publishing with a routing
//! key delivers a copy of the message to every queue bound to that key.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Message broker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Broker backend: `"memory"` or `"redis"`.
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Redis connection URL (redis backend only).
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    /// Exchange that lifecycle events are published to.
    #[serde(default = "default_exchange")]
    pub exchange: String,
    /// Routing key for `user.registered` events.
    #[serde(default = "default_registered_key")]
    pub registered_routing_key: String,
    /// Queue mirrored by the downstream user service.
    #[serde(default = "default_user_queue")]
    pub user_queue: String,
    /// Queue this service consumes deletion requests from.
    #[serde(default = "default_auth_queue")]
    pub auth_queue: String,
    /// Extra routing-key → queue bindings on top of the registered-event
    /// binding (`registered_routing_key` → `user_queue`).
    #[serde(default)]
    pub bindings: HashMap<String, Vec<String>>,
    /// Upper bound on a single publish hand-off, in milliseconds.
    #[serde(default = "default_publish_timeout")]
    pub publish_timeout_ms: u64,
    /// How long one consumer poll blocks waiting for a delivery, in seconds.
    #[serde(default = "default_poll_timeout")]
    pub consumer_poll_timeout_seconds: u64,
    /// Suffix of the per-queue list holding in-flight deliveries (redis
    /// backend only).
    #[serde(default = "default_processing_suffix")]
    pub processing_suffix: String,
}

impl BrokerConfig {
    /// All bindings for `routing_key`, including the built-in one.
    pub fn queues_for(&self, routing_key: &str) -> Vec<String> {
        let mut queues = Vec::new();
        if routing_key == self.registered_routing_key {
            queues.push(self.user_queue.clone());
        }
        if let Some(extra) = self.bindings.get(routing_key) {
            for queue in extra {
                if !queues.contains(queue) {
                    queues.push(queue.clone());
                }
            }
        }
        queues
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            redis_url: default_redis_url(),
            exchange: default_exchange(),
            registered_routing_key: default_registered_key(),
            user_queue: default_user_queue(),
            auth_queue: default_auth_queue(),
            bindings: HashMap::new(),
            publish_timeout_ms: default_publish_timeout(),
            consumer_poll_timeout_seconds: default_poll_timeout(),
            processing_suffix: default_processing_suffix(),
        }
    }
}

fn default_backend() -> String {
    "memory".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_exchange() -> String {
    "app".to_string()
}

fn default_registered_key() -> String {
    "user.registered".to_string()
}

fn default_user_queue() -> String {
    "user.queue".to_string()
}

fn default_auth_queue() -> String {
    "auth.queue".to_string()
}

fn default_publish_timeout() -> u64 {
    5_000
}

fn default_poll_timeout() -> u64 {
    5
}

fn default_processing_suffix() -> String {
    ":processing".to_string()
}
