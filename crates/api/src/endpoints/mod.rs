//! API endpoints.

mod auth;
mod connections;
mod notifications;
mod profile;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(connections::router())
        .merge(profile::router())
        .merge(notifications::router())
}
