//! Connection set repository (follower, following, muted and blocked records).
//!
//! Every user owns exactly one row in each of the four tables. Loads and
//! saves take any [`ConnectionTrait`] so that the service layer can run a
//! whole action inside one transaction, with the rows it touches locked.

use std::sync::Arc;

use crate::entities::{Blocked, Follower, Following, Muted, blocked, follower, following, muted};
use bumblebee_common::{AppError, AppResult};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Unchanged, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, QuerySelect, Select, Set, TransactionTrait,
};
use serde_json::json;

/// Row lock taken while loading a connection set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLock {
    /// Plain read.
    Skip,
    /// `SELECT ... FOR UPDATE`, held until the transaction ends.
    Exclusive,
}

fn with_lock<E: EntityTrait>(select: Select<E>, lock: RowLock) -> Select<E> {
    match lock {
        RowLock::Skip => select,
        RowLock::Exclusive => select.lock_exclusive(),
    }
}

fn missing(kind: &str, user_id: &str) -> AppError {
    AppError::Internal(format!("{kind} set missing for user {user_id}"))
}

/// Connection set repository for database operations.
#[derive(Clone)]
pub struct ConnectionRepository {
    db: Arc<DatabaseConnection>,
}

impl ConnectionRepository {
    /// Create a new connection repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Start a transaction on the underlying connection.
    pub async fn begin(&self) -> AppResult<DatabaseTransaction> {
        self.db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Load the follower set owned by `user_id`.
    pub async fn load_follower<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        lock: RowLock,
    ) -> AppResult<follower::Model> {
        with_lock(Follower::find_by_id(user_id), lock)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| missing("Follower", user_id))
    }

    /// Load the following set owned by `user_id`.
    pub async fn load_following<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        lock: RowLock,
    ) -> AppResult<following::Model> {
        with_lock(Following::find_by_id(user_id), lock)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| missing("Following", user_id))
    }

    /// Load the muted set owned by `user_id`.
    pub async fn load_muted<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        lock: RowLock,
    ) -> AppResult<muted::Model> {
        with_lock(Muted::find_by_id(user_id), lock)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| missing("Muted", user_id))
    }

    /// Load the blocked set owned by `user_id`.
    pub async fn load_blocked<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        lock: RowLock,
    ) -> AppResult<blocked::Model> {
        with_lock(Blocked::find_by_id(user_id), lock)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| missing("Blocked", user_id))
    }

    /// Read the follower set outside of any transaction.
    pub async fn get_follower(&self, user_id: &str) -> AppResult<follower::Model> {
        self.load_follower(self.db.as_ref(), user_id, RowLock::Skip)
            .await
    }

    /// Read the following set outside of any transaction.
    pub async fn get_following(&self, user_id: &str) -> AppResult<following::Model> {
        self.load_following(self.db.as_ref(), user_id, RowLock::Skip)
            .await
    }

    /// Read the muted set outside of any transaction.
    pub async fn get_muted(&self, user_id: &str) -> AppResult<muted::Model> {
        self.load_muted(self.db.as_ref(), user_id, RowLock::Skip)
            .await
    }

    /// Read the blocked set outside of any transaction.
    pub async fn get_blocked(&self, user_id: &str) -> AppResult<blocked::Model> {
        self.load_blocked(self.db.as_ref(), user_id, RowLock::Skip)
            .await
    }

    /// Overwrite both lists of a follower set.
    pub async fn save_follower<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        follower: &[String],
        requests_for_follow: &[String],
    ) -> AppResult<follower::Model> {
        follower::ActiveModel {
            user_id: Unchanged(user_id.to_string()),
            follower: Set(json!(follower)),
            requests_for_follow: Set(json!(requests_for_follow)),
            updated_at: Set(Some(Utc::now().into())),
        }
        .update(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Overwrite both lists of a following set.
    pub async fn save_following<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        following: &[String],
        requesting_to_follow: &[String],
    ) -> AppResult<following::Model> {
        following::ActiveModel {
            user_id: Unchanged(user_id.to_string()),
            following: Set(json!(following)),
            requesting_to_follow: Set(json!(requesting_to_follow)),
            updated_at: Set(Some(Utc::now().into())),
        }
        .update(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Overwrite the muted list.
    pub async fn save_muted<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        muted: &[String],
    ) -> AppResult<muted::Model> {
        muted::ActiveModel {
            user_id: Unchanged(user_id.to_string()),
            muted: Set(json!(muted)),
            updated_at: Set(Some(Utc::now().into())),
        }
        .update(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Overwrite the blocked list.
    pub async fn save_blocked<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        blocked: &[String],
    ) -> AppResult<blocked::Model> {
        blocked::ActiveModel {
            user_id: Unchanged(user_id.to_string()),
            blocked: Set(json!(blocked)),
            updated_at: Set(Some(Utc::now().into())),
        }
        .update(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }
}
