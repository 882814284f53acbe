//! Idempotent removal of user records.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use warden_core::events::DeletionRequest;
use warden_core::result::AppResult;
use warden_core::types::id::UserId;
use warden_database::UserRepository;
use warden_messaging::DeletionHandler;

/// Deletes users on request. Removing a missing user is not an error.
#[derive(Debug, Clone)]
pub struct UserRemovalService {
    users: Arc<dyn UserRepository>,
}

impl UserRemovalService {
    /// Creates a new removal service.
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Remove the user with `id`. Returns whether a record was deleted.
    pub async fn remove(&self, id: UserId) -> AppResult<bool> {
        let removed = self.users.delete_by_id(id).await?;
        if removed {
            info!(user_id = %id, "User removed");
        } else {
            debug!(user_id = %id, "User already absent");
        }
        Ok(removed)
    }
}

#[async_trait]
impl DeletionHandler for UserRemovalService {
    async fn handle(&self, request: &DeletionRequest) -> AppResult<()> {
        match request.parsed_id() {
            Some(id) => self.remove(id).await.map(|_| ()),
            None => {
                debug!(user_id = %request.user_id, "Deletion request for unknown id format");
                Ok(())
            }
        }
    }
}
