//! Connection endpoints: follow, mute and block actions and listings.

use axum::{
    Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use bumblebee_common::AppResult;
use bumblebee_core::{
    Capability, ConnectionsListing, FollowerListing, FollowingListing, LookupResult, UserListing,
    authorize,
};
use serde::Deserialize;

use crate::{
    extractors::{ApiJson, MaybeAuthUser, UsernameBody},
    middleware::AppState,
    response::{ActionResponse, ApiResponse},
};

/// Connection lookup request.
#[derive(Debug, Deserialize)]
pub struct LookupRequest {
    #[serde(default)]
    pub connection_userid_list: Vec<String>,
}

/// Follow, unfollow, request or cancel a request.
async fn follow_unfollow(
    MaybeAuthUser(caller): MaybeAuthUser,
    State(state): State<AppState>,
    UsernameBody(username): UsernameBody,
) -> AppResult<ActionResponse> {
    let actor = authorize(caller.as_ref(), Capability::Authenticated)?;
    let outcome = state
        .connection_service
        .toggle_follow(&actor, &username)
        .await?;
    Ok(outcome.into())
}

/// Accept a pending follow request.
async fn accept_follow(
    MaybeAuthUser(caller): MaybeAuthUser,
    State(state): State<AppState>,
    UsernameBody(username): UsernameBody,
) -> AppResult<ActionResponse> {
    let owner = authorize(caller.as_ref(), Capability::Authenticated)?;
    let outcome = state
        .connection_service
        .accept_follow(&owner, &username)
        .await?;
    Ok(outcome.into())
}

/// Reject a pending follow request.
async fn reject_follow(
    MaybeAuthUser(caller): MaybeAuthUser,
    State(state): State<AppState>,
    UsernameBody(username): UsernameBody,
) -> AppResult<ActionResponse> {
    let owner = authorize(caller.as_ref(), Capability::Authenticated)?;
    let outcome = state
        .connection_service
        .reject_follow(&owner, &username)
        .await?;
    Ok(outcome.into())
}

/// Remove an accepted follower.
async fn remove_follower(
    MaybeAuthUser(caller): MaybeAuthUser,
    State(state): State<AppState>,
    UsernameBody(username): UsernameBody,
) -> AppResult<ActionResponse> {
    let owner = authorize(caller.as_ref(), Capability::Authenticated)?;
    let outcome = state
        .connection_service
        .remove_follower(&owner, &username)
        .await?;
    Ok(outcome.into())
}

/// Mute or unmute a user.
async fn mute_unmute(
    MaybeAuthUser(caller): MaybeAuthUser,
    State(state): State<AppState>,
    UsernameBody(username): UsernameBody,
) -> AppResult<ActionResponse> {
    let actor = authorize(caller.as_ref(), Capability::Authenticated)?;
    let outcome = state
        .connection_service
        .toggle_mute(&actor, &username)
        .await?;
    Ok(outcome.into())
}

/// Block or unblock a user.
async fn block_unblock(
    MaybeAuthUser(caller): MaybeAuthUser,
    State(state): State<AppState>,
    UsernameBody(username): UsernameBody,
) -> AppResult<ActionResponse> {
    let actor = authorize(caller.as_ref(), Capability::Authenticated)?;
    let outcome = state
        .connection_service
        .toggle_block(&actor, &username)
        .await?;
    Ok(outcome.into())
}

/// Followers of a user.
async fn followers(
    MaybeAuthUser(caller): MaybeAuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<ApiResponse<FollowerListing>> {
    let viewer = authorize(caller.as_ref(), Capability::Authenticated)?;
    let listing = state
        .connection_service
        .get_followers(Some(viewer.user()), &username)
        .await?;
    Ok(ApiResponse::ok(listing))
}

/// Users a user follows.
async fn following(
    MaybeAuthUser(caller): MaybeAuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<ApiResponse<FollowingListing>> {
    let viewer = authorize(caller.as_ref(), Capability::Authenticated)?;
    let listing = state
        .connection_service
        .get_following(Some(viewer.user()), &username)
        .await?;
    Ok(ApiResponse::ok(listing))
}

/// Followers and followees of a user, with muted and blocked for the owner.
async fn connections(
    MaybeAuthUser(caller): MaybeAuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<ApiResponse<ConnectionsListing>> {
    let viewer = authorize(caller.as_ref(), Capability::Authenticated)?;
    let listing = state
        .connection_service
        .get_connections(Some(viewer.user()), &username)
        .await?;
    Ok(ApiResponse::ok(listing))
}

/// Resolve user ids to users.
async fn lookup(
    MaybeAuthUser(caller): MaybeAuthUser,
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LookupRequest>,
) -> AppResult<ApiResponse<LookupResult>> {
    authorize(caller.as_ref(), Capability::Authenticated)?;
    let result = state
        .connection_service
        .lookup_users(&req.connection_userid_list)
        .await?;
    Ok(ApiResponse::ok(result))
}

/// The caller's muted users.
async fn muted(
    MaybeAuthUser(caller): MaybeAuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UserListing>> {
    let owner = authorize(caller.as_ref(), Capability::Authenticated)?;
    let listing = state.connection_service.get_muted(&owner).await?;
    Ok(ApiResponse::ok(listing))
}

/// The caller's blocked users.
async fn blocked(
    MaybeAuthUser(caller): MaybeAuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UserListing>> {
    let owner = authorize(caller.as_ref(), Capability::Authenticated)?;
    let listing = state.connection_service.get_blocked(&owner).await?;
    Ok(ApiResponse::ok(listing))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/follow-unfollow", post(follow_unfollow))
        .route("/accept-follow", post(accept_follow))
        .route("/reject-follow", delete(reject_follow))
        .route("/remove-follower", delete(remove_follower))
        .route("/mute-unmute", post(mute_unmute))
        .route("/block-unblock", post(block_unblock))
        .route("/followers/{username}", get(followers))
        .route("/following/{username}", get(following))
        .route("/connections/lookup", post(lookup))
        .route("/connections/{username}", get(connections))
        .route("/muted", get(muted))
        .route("/blocked", get(blocked))
}
