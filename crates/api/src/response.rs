//! API response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bumblebee_core::ActionOutcome;
use serde::Serialize;

/// Body returned by every connection action.
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    /// HTTP status code, repeated in the body.
    pub status: u16,
    /// Task performed.
    pub task: String,
    /// Confirmation naming the other party.
    pub message: String,
}

impl From<ActionOutcome> for ActionResponse {
    fn from(outcome: ActionOutcome) -> Self {
        Self {
            status: StatusCode::OK.as_u16(),
            task: outcome.task.to_string(),
            message: outcome.message,
        }
    }
}

impl IntoResponse for ActionResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Standard read response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// HTTP status code, repeated in the body.
    pub status: u16,
    /// Payload.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response.
    pub const fn ok(data: T) -> Self {
        Self { status: 200, data }
    }

    /// Create a response for a newly created resource.
    pub const fn created(data: T) -> Self {
        Self { status: 201, data }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}
