//! Sign-up and sign-in endpoints.

use axum::{Router, extract::State, routing::post};
use bumblebee_common::AppResult;
use bumblebee_core::{Session, SigninInput, SignupInput};

use crate::{extractors::ApiJson, middleware::AppState, response::ApiResponse};

/// Register a new user.
async fn signup(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<SignupInput>,
) -> AppResult<ApiResponse<Session>> {
    let session = state.user_service.signup(input).await?;
    Ok(ApiResponse::created(session))
}

/// Exchange credentials for a bearer token.
async fn signin(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<SigninInput>,
) -> AppResult<ApiResponse<Session>> {
    let session = state.user_service.signin(input).await?;
    Ok(ApiResponse::ok(session))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
}
