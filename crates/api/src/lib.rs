//! HTTP API layer for bumblebee.
//!
//! - **Endpoints**: connection actions and queries, sign-up/sign-in,
//!   profile privacy, notifications
//! - **Extractors**: optional caller, request bodies with typed rejections
//! - **Middleware**: bearer-token authentication
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
