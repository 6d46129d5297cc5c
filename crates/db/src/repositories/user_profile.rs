//! User profile repository.

use std::sync::Arc;

use crate::entities::{UserProfile, user_profile};
use bumblebee_common::{AppError, AppResult};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

/// User profile repository for database operations.
#[derive(Clone)]
pub struct UserProfileRepository {
    db: Arc<DatabaseConnection>,
}

impl UserProfileRepository {
    /// Create a new user profile repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user profile by user ID.
    pub async fn find_by_user_id(&self, user_id: &str) -> AppResult<Option<user_profile::Model>> {
        UserProfile::find_by_id(user_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a user profile by user ID.
    ///
    /// Every user gets a profile at creation, so a missing row is a server
    /// fault rather than a client error.
    pub async fn get_by_user_id(&self, user_id: &str) -> AppResult<user_profile::Model> {
        self.find_by_user_id(user_id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Profile missing for user {user_id}")))
    }

    /// Whether the user's profile is private.
    pub async fn is_private(&self, user_id: &str) -> AppResult<bool> {
        Ok(self.get_by_user_id(user_id).await?.private)
    }

    /// Set the privacy flag of a profile.
    pub async fn set_private(&self, user_id: &str, private: bool) -> AppResult<user_profile::Model> {
        let profile = self.get_by_user_id(user_id).await?;
        let mut active: user_profile::ActiveModel = profile.into();
        active.private = Set(private);
        active.updated_at = Set(Some(Utc::now().into()));
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
