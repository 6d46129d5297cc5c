//! Request extractors.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
};
use bumblebee_common::AppError;
use bumblebee_db::entities::user;
use serde::{Deserialize, de::DeserializeOwned};

/// Optional authenticated user extractor.
///
/// Handlers pass the inner value to [`bumblebee_core::authorize`].
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<user::Model>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by auth middleware
        Ok(Self(parts.extensions.get::<user::Model>().cloned()))
    }
}

#[derive(Deserialize)]
struct UsernameRequest {
    #[serde(default)]
    username: Option<String>,
}

/// Target username taken from a `{"username": ...}` body.
///
/// A malformed body, a missing field and a blank value are all rejected
/// with `MissingField`.
#[derive(Debug, Clone)]
pub struct UsernameBody(pub String);

impl<S> FromRequest<S> for UsernameBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let missing = || AppError::MissingField("username".to_string());

        let Json(body) = Json::<UsernameRequest>::from_request(req, state)
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected action body");
                missing()
            })?;

        body.username
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .map(Self)
            .ok_or_else(missing)
    }
}

/// JSON body whose rejection renders as an [`AppError`].
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
