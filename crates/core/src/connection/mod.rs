//! Connection sets and the transitions between them.

pub mod engine;
pub mod members;
pub mod sets;

pub use engine::{
    ConnectionEvent, Task, Transition, accept_request, reject_request, remove_follower,
    toggle_block, toggle_follow, toggle_mute,
};
pub use members::MemberList;
pub use sets::{BlockedSet, FollowerSet, FollowingSet, MutedSet};
