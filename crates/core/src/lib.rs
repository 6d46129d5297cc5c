//! Core business logic for bumblebee.
//!
//! [`connection`] holds the in-memory connection sets and the transitions
//! between them; [`services`] wraps them with persistence, event delivery
//! and the read side.

pub mod authz;
pub mod connection;
pub mod services;

pub use authz::{Authorized, Capability, authorize};
pub use services::{
    ActionOutcome, ConnectionService, ConnectionsListing, EventSink, EventSinkService,
    FollowerListing, FollowingListing, LookupResult, NotificationService, Session, SigninInput,
    SignupInput, UserListing, UserService, UserSummary,
};
