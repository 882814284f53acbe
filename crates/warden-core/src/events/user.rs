//! User lifecycle message bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::EventKind;
use crate::types::id::{EventId, UserId};

/// Emitted once per successful verification so downstream services can
/// mirror the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRegistered {
    /// Always [`EventKind::UserRegistered`].
    pub kind: EventKind,
    /// Unique id of this emission, usable as a dedup key downstream.
    pub event_id: EventId,
    /// The verified user.
    pub user_id: UserId,
    /// The user's unique display name.
    pub name: String,
    /// When the event was produced.
    pub emitted_at: DateTime<Utc>,
}

impl UserRegistered {
    /// Create a new event stamped with the current time.
    pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
        Self {
            kind: EventKind::UserRegistered,
            event_id: EventId::new(),
            user_id,
            name: name.into(),
            emitted_at: Utc::now(),
        }
    }
}

/// Sent by the downstream service when it wants a user removed here.
///
/// The id is kept as received: an id that does not parse can never match a
/// stored record, which makes its removal a no-op rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionRequest {
    /// Id of the user to remove.
    pub user_id: String,
}

impl DeletionRequest {
    /// Create a request for the given id.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    /// The id as a typed [`UserId`], if it is a valid UUID.
    pub fn parsed_id(&self) -> Option<UserId> {
        self.user_id.trim().parse().ok()
    }
}
