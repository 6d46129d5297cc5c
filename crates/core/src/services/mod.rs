//! Business logic services.

pub mod connection;
pub mod event_sink;
pub mod notification;
pub mod user;

pub use connection::{
    ActionOutcome, ConnectionService, ConnectionsListing, FollowerListing, FollowingListing,
    LookupResult, UserListing, UserSummary,
};
pub use event_sink::{EventSink, EventSinkService};
pub use notification::NotificationService;
pub use user::{Session, SigninInput, SignupInput, UserService};
