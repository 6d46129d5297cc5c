//! Profile endpoints.

use axum::{Router, extract::State, routing::post};
use bumblebee_common::AppResult;
use bumblebee_core::{Capability, authorize};
use bumblebee_db::entities::user_profile;
use serde::Deserialize;

use crate::{
    extractors::{ApiJson, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Privacy update request.
#[derive(Debug, Deserialize)]
pub struct PrivacyRequest {
    pub private: bool,
}

/// Make the caller's profile private or public.
async fn set_privacy(
    MaybeAuthUser(caller): MaybeAuthUser,
    State(state): State<AppState>,
    ApiJson(req): ApiJson<PrivacyRequest>,
) -> AppResult<ApiResponse<user_profile::Model>> {
    let owner = authorize(caller.as_ref(), Capability::Authenticated)?;
    let profile = state
        .user_service
        .set_privacy(owner.id(), req.private)
        .await?;
    Ok(ApiResponse::ok(profile))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/profile/privacy", post(set_privacy))
}
