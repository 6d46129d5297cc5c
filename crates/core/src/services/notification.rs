//! Notification service.

use crate::connection::ConnectionEvent;
use crate::services::event_sink::EventSink;
use async_trait::async_trait;
use bumblebee_common::{AppResult, IdGenerator};
use bumblebee_db::{
    entities::notification::{self, NotificationType},
    repositories::NotificationRepository,
};
use sea_orm::Set;

/// Default page size for notification listings.
pub const DEFAULT_LIMIT: u64 = 20;

/// Largest page size a client may request.
pub const MAX_LIMIT: u64 = 100;

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(notification_repo: NotificationRepository) -> Self {
        Self {
            notification_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Record a notification for `notifiee_id` caused by `notifier_id`.
    pub async fn create(
        &self,
        notifiee_id: &str,
        notifier_id: &str,
        notification_type: NotificationType,
    ) -> AppResult<notification::Model> {
        let model = notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            notifiee_id: Set(notifiee_id.to_string()),
            notifier_id: Set(notifier_id.to_string()),
            notification_type: Set(notification_type),
            is_read: Set(false),
            ..Default::default()
        };

        self.notification_repo.create(model).await
    }

    /// Notifications for a user, newest first.
    ///
    /// `limit` defaults to [`DEFAULT_LIMIT`] and is capped at [`MAX_LIMIT`].
    pub async fn list(
        &self,
        user_id: &str,
        limit: Option<u64>,
        until_id: Option<&str>,
    ) -> AppResult<Vec<notification::Model>> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        self.notification_repo
            .find_by_user(user_id, limit, until_id)
            .await
    }
}

/// Notification type recorded for a connection event.
#[must_use]
pub const fn notification_type_for(event: &ConnectionEvent) -> NotificationType {
    match event {
        ConnectionEvent::NewFollower { .. } => NotificationType::NewFollower,
        ConnectionEvent::FollowRequest { .. } => NotificationType::FollowRequest,
        ConnectionEvent::FollowAccepted { .. } => NotificationType::FollowRequestAccepted,
        ConnectionEvent::FollowRejected { .. } => NotificationType::FollowRequestRejected,
    }
}

#[async_trait]
impl EventSink for NotificationService {
    async fn deliver(&self, event: &ConnectionEvent) -> AppResult<()> {
        let created = self
            .create(
                event.owner_id(),
                event.other_party_id(),
                notification_type_for(event),
            )
            .await?;

        tracing::debug!(
            notification_id = %created.id,
            notifiee_id = %created.notifiee_id,
            "Created notification"
        );
        Ok(())
    }
}
