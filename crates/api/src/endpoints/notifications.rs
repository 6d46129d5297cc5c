//! Notifications endpoints.

use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};
use bumblebee_common::{AppError, AppResult};
use bumblebee_core::{Capability, authorize};
use bumblebee_db::entities::notification::Model as NotificationModel;
use serde::Deserialize;

use crate::{extractors::MaybeAuthUser, middleware::AppState, response::ApiResponse};

/// List notifications query.
#[derive(Debug, Default, Deserialize)]
pub struct ListNotificationsQuery {
    /// Maximum results (default: 20, max: 100)
    pub limit: Option<u64>,
    /// Cursor for pagination (before this ID)
    pub until_id: Option<String>,
}

/// The caller's notifications, newest first.
async fn list_notifications(
    MaybeAuthUser(caller): MaybeAuthUser,
    State(state): State<AppState>,
    query: Result<Query<ListNotificationsQuery>, QueryRejection>,
) -> AppResult<ApiResponse<Vec<NotificationModel>>> {
    let owner = authorize(caller.as_ref(), Capability::Authenticated)?;
    let Query(query) = query.map_err(|e| AppError::Validation(e.body_text()))?;

    let notifications = state
        .notification_service
        .list(owner.id(), query.limit, query.until_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(notifications))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/notifications", get(list_notifications))
}
