//! User repository.

use std::sync::Arc;

use crate::entities::{User, blocked, follower, following, muted, user, user_profile};
use bumblebee_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde_json::json;

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a user by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id `{id}` does not exist")))
    }

    /// Find users by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<user::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        User::find()
            .filter(user::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by username (case-insensitive).
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::UsernameLower.eq(username.to_lowercase()))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a user by username, returning an error if not found.
    pub async fn get_by_username(&self, username: &str) -> AppResult<user::Model> {
        self.find_by_username(username).await?.ok_or_else(|| {
            AppError::NotFound(format!("User with username `{username}` does not exist"))
        })
    }

    /// Find a user by email.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Email.eq(email.to_lowercase()))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by access token.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Token.eq(token))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a user together with its profile and its four connection sets.
    ///
    /// Everything is written in one transaction, so a user never exists
    /// without its follower, following, muted and blocked records.
    pub async fn create_with_connections(
        &self,
        model: user::ActiveModel,
        profile: user_profile::ActiveModel,
    ) -> AppResult<user::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let user = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut profile = profile;
        profile.user_id = Set(user.id.clone());
        profile
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        follower::ActiveModel {
            user_id: Set(user.id.clone()),
            follower: Set(json!([])),
            requests_for_follow: Set(json!([])),
            updated_at: Set(None),
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        following::ActiveModel {
            user_id: Set(user.id.clone()),
            following: Set(json!([])),
            requesting_to_follow: Set(json!([])),
            updated_at: Set(None),
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        muted::ActiveModel {
            user_id: Set(user.id.clone()),
            muted: Set(json!([])),
            updated_at: Set(None),
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        blocked::ActiveModel {
            user_id: Set(user.id.clone()),
            blocked: Set(json!([])),
            updated_at: Set(None),
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(user_id = %user.id, "Created user with profile and connection sets");

        Ok(user)
    }

    /// Update a user.
    pub async fn update(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            username_lower: username.to_lowercase(),
            email: format!("{}@example.com", username.to_lowercase()),
            password: "hash".to_string(),
            token: Some("test_token".to_string()),
            is_active: true,
            email_verified: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_id_found() {
        let user = create_test_user("user1", "alice");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.find_by_id("user1").await.unwrap();

        assert_eq!(result.unwrap().username, "alice");
    }

    #[tokio::test]
    async fn test_get_by_username_not_found_returns_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.get_by_username("ghost").await;

        match result {
            Err(AppError::NotFound(msg)) => assert!(msg.contains("ghost")),
            _ => panic!("Expected NotFound error"),
        }
    }

    #[tokio::test]
    async fn test_find_by_ids_empty_skips_query() {
        // No query results are appended: a query would fail the mock.
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = UserRepository::new(db);
        let result = repo.find_by_ids(&[]).await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_find_by_token() {
        let user = create_test_user("user1", "alice");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.find_by_token("test_token").await.unwrap();

        assert_eq!(result.unwrap().id, "user1");
    }

    #[tokio::test]
    async fn test_create_with_connections_inserts_all_records() {
        let user = create_test_user("user1", "alice");
        let now = Utc::now();

        let profile = user_profile::Model {
            user_id: "user1".to_string(),
            name: None,
            nickname: None,
            bio: None,
            location: None,
            private: false,
            account_verified: false,
            created_at: now.into(),
            updated_at: None,
        };
        let follower = follower::Model {
            user_id: "user1".to_string(),
            follower: json!([]),
            requests_for_follow: json!([]),
            updated_at: None,
        };
        let following = following::Model {
            user_id: "user1".to_string(),
            following: json!([]),
            requesting_to_follow: json!([]),
            updated_at: None,
        };
        let muted = muted::Model {
            user_id: "user1".to_string(),
            muted: json!([]),
            updated_at: None,
        };
        let blocked = blocked::Model {
            user_id: "user1".to_string(),
            blocked: json!([]),
            updated_at: None,
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .append_query_results([[profile]])
                .append_query_results([[follower]])
                .append_query_results([[following]])
                .append_query_results([[muted]])
                .append_query_results([[blocked]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let created = repo
            .create_with_connections(
                user::ActiveModel {
                    id: Set("user1".to_string()),
                    username: Set("alice".to_string()),
                    username_lower: Set("alice".to_string()),
                    email: Set("alice@example.com".to_string()),
                    password: Set("hash".to_string()),
                    token: Set(Some("test_token".to_string())),
                    ..Default::default()
                },
                <user_profile::ActiveModel as Default>::default(),
            )
            .await
            .unwrap();

        assert_eq!(created.id, "user1");
    }
}
