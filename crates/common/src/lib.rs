//! Common utilities and shared types for bumblebee.
//!
//! - **Configuration**: application settings via [`Config`]
//! - **Error handling**: unified error type via [`AppError`] and [`AppResult`]
//! - **ID generation**: ULID identifiers and bearer tokens via [`IdGenerator`]

pub mod config;
pub mod error;
pub mod id;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
