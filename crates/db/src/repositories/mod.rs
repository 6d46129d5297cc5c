//! Repositories wrapping database access per aggregate.

mod connection;
mod notification;
mod user;
mod user_profile;

pub use connection::{ConnectionRepository, RowLock};
pub use notification::NotificationRepository;
pub use user::UserRepository;
pub use user_profile::UserProfileRepository;
