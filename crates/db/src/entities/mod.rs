//! Database entities.

pub mod blocked;
pub mod follower;
pub mod following;
pub mod muted;
pub mod notification;
pub mod user;
pub mod user_profile;

pub use blocked::Entity as Blocked;
pub use follower::Entity as Follower;
pub use following::Entity as Following;
pub use muted::Entity as Muted;
pub use notification::Entity as Notification;
pub use user::Entity as User;
pub use user_profile::Entity as UserProfile;
