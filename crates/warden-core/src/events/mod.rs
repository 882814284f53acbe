//! Lifecycle messages exchanged with other services over the broker.
//!
//! Outbound events are produced exactly once per successful transition
//! and delivered at-least-once; inbound requests may arrive duplicated
//! and in any order relative to local mutations.

pub mod user;

use serde::{Deserialize, Serialize};

pub use user::{DeletionRequest, UserRegistered};

/// Discriminator carried in every outbound event body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// A user finished email verification.
    #[serde(rename = "user.registered")]
    UserRegistered,
}

impl EventKind {
    /// The wire name of this event kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserRegistered => "user.registered",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
