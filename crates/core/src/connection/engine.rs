//! Connection transitions.
//!
//! Every function here mutates in-memory sets only and reports what happened
//! as a [`Transition`]. Loading, locking and saving the sets is the caller's
//! job, as is delivering the returned events.

use super::sets::{BlockedSet, FollowerSet, FollowingSet, MutedSet};
use bumblebee_common::{AppError, AppResult};
use serde::{Serialize, Serializer};
use std::fmt;

/// Outcome of a connection action, as reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Actor now follows a public target.
    Follow,
    /// Actor stopped following the target.
    Unfollow,
    /// Actor asked to follow a private target.
    RequestFollow,
    /// Actor withdrew a pending request.
    CancelRequestFollow,
    /// Owner accepted a pending request.
    AcceptFollow,
    /// Owner rejected a pending request.
    RejectFollow,
    /// Reject was called without a pending request.
    NoRequestForFollow,
    /// Owner dropped an accepted follower.
    RemoveFollower,
    /// Remove-follower was called for someone who is not a follower.
    NotFollowing,
    /// Actor muted the target.
    Mute,
    /// Actor unmuted the target.
    Unmute,
    /// Actor blocked the target.
    Block,
    /// Actor unblocked the target.
    Unblock,
}

impl Task {
    /// Wire name of the task.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Follow => "Follow",
            Self::Unfollow => "Unfollow",
            Self::RequestFollow => "Request Follow",
            Self::CancelRequestFollow => "Cancel Request Follow",
            Self::AcceptFollow | Self::RejectFollow => "follow",
            Self::NoRequestForFollow => "no request for follow",
            Self::RemoveFollower => "Remove Follower",
            Self::NotFollowing => "not following",
            Self::Mute => "Mute",
            Self::Unmute => "Unmute",
            Self::Block => "Block",
            Self::Unblock => "Unblock",
        }
    }

    /// Whether the task changed any stored set.
    #[must_use]
    pub const fn mutates(self) -> bool {
        !matches!(self, Self::NoRequestForFollow | Self::NotFollowing)
    }

    /// Human-readable confirmation naming the other party.
    #[must_use]
    pub fn message(self, username: &str) -> String {
        match self {
            Self::AcceptFollow => format!("Successfully accepted @{username} for follow"),
            Self::RejectFollow => format!("Successfully rejected @{username}"),
            Self::NoRequestForFollow => {
                format!("User @{username} has not requested to follow you.")
            }
            Self::RemoveFollower => format!("Successfully removed follower @{username}"),
            Self::NotFollowing => format!("User @{username} is not following you."),
            _ => format!("Successfully {} @{username}", self.as_str()),
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Task {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Event produced by a transition, addressed to the user it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// `follower_id` started following `owner_id`.
    NewFollower {
        /// User being followed.
        owner_id: String,
        /// New follower.
        follower_id: String,
    },
    /// `requester_id` asked to follow `owner_id`.
    FollowRequest {
        /// Private user receiving the request.
        owner_id: String,
        /// Requesting user.
        requester_id: String,
    },
    /// `accepter_id` accepted the request made by `owner_id`.
    FollowAccepted {
        /// Original requester.
        owner_id: String,
        /// User who accepted.
        accepter_id: String,
    },
    /// `rejecter_id` rejected the request made by `owner_id`.
    FollowRejected {
        /// Original requester.
        owner_id: String,
        /// User who rejected.
        rejecter_id: String,
    },
}

impl ConnectionEvent {
    /// User the event is addressed to.
    #[must_use]
    pub fn owner_id(&self) -> &str {
        match self {
            Self::NewFollower { owner_id, .. }
            | Self::FollowRequest { owner_id, .. }
            | Self::FollowAccepted { owner_id, .. }
            | Self::FollowRejected { owner_id, .. } => owner_id,
        }
    }

    /// User who caused the event.
    #[must_use]
    pub fn other_party_id(&self) -> &str {
        match self {
            Self::NewFollower { follower_id, .. } => follower_id,
            Self::FollowRequest { requester_id, .. } => requester_id,
            Self::FollowAccepted { accepter_id, .. } => accepter_id,
            Self::FollowRejected { rejecter_id, .. } => rejecter_id,
        }
    }
}

/// Result of applying an action to in-memory sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// What happened.
    pub task: Task,
    /// Events to deliver once the change is committed.
    pub events: Vec<ConnectionEvent>,
}

impl Transition {
    const fn quiet(task: Task) -> Self {
        Self {
            task,
            events: Vec::new(),
        }
    }

    fn with_events(task: Task, events: Vec<ConnectionEvent>) -> Self {
        Self { task, events }
    }
}

/// Toggle the follow relation from the owner of `actor` to the owner of
/// `target`.
///
/// An existing follow is undone and a pending request is cancelled.
/// Otherwise a public target is followed directly and a private target
/// receives a request.
pub fn toggle_follow(
    actor: &mut FollowingSet,
    target: &mut FollowerSet,
    target_private: bool,
) -> AppResult<Transition> {
    let actor_id = actor.owner_id.clone();
    let target_id = target.owner_id.clone();

    if actor_id == target_id {
        return Err(AppError::SelfReference);
    }

    if actor.following.contains(&target_id) || target.follower.contains(&actor_id) {
        actor.following.remove(&target_id);
        target.follower.remove(&actor_id);
        return Ok(Transition::quiet(Task::Unfollow));
    }

    let pending = actor.requesting_to_follow.contains(&target_id)
        || target.requests_for_follow.contains(&actor_id);

    if target_private {
        if pending {
            actor.requesting_to_follow.remove(&target_id);
            target.requests_for_follow.remove(&actor_id);
            return Ok(Transition::quiet(Task::CancelRequestFollow));
        }

        actor.requesting_to_follow.insert(&target_id);
        target.requests_for_follow.insert(&actor_id);
        return Ok(Transition::with_events(
            Task::RequestFollow,
            vec![ConnectionEvent::FollowRequest {
                owner_id: target_id,
                requester_id: actor_id,
            }],
        ));
    }

    // The target went public while a request was pending.
    actor.requesting_to_follow.remove(&target_id);
    target.requests_for_follow.remove(&actor_id);

    actor.following.insert(&target_id);
    target.follower.insert(&actor_id);
    Ok(Transition::with_events(
        Task::Follow,
        vec![ConnectionEvent::NewFollower {
            owner_id: target_id,
            follower_id: actor_id,
        }],
    ))
}

/// Accept the pending request of `requester` on `owner`'s follower set.
pub fn accept_request(
    owner: &mut FollowerSet,
    requester: &mut FollowingSet,
) -> AppResult<Transition> {
    let owner_id = owner.owner_id.clone();
    let requester_id = requester.owner_id.clone();

    if owner.follower.contains(&requester_id) {
        return Err(AppError::PreExistence(
            "User is already following you".to_string(),
        ));
    }

    if !owner.requests_for_follow.contains(&requester_id) {
        return Err(AppError::NotFound(
            "No pending follow request from this user".to_string(),
        ));
    }

    owner.requests_for_follow.remove(&requester_id);
    requester.requesting_to_follow.remove(&owner_id);

    owner.follower.insert(&requester_id);
    requester.following.insert(&owner_id);

    Ok(Transition::with_events(
        Task::AcceptFollow,
        vec![
            ConnectionEvent::FollowAccepted {
                owner_id: requester_id.clone(),
                accepter_id: owner_id.clone(),
            },
            ConnectionEvent::NewFollower {
                owner_id,
                follower_id: requester_id,
            },
        ],
    ))
}

/// Reject the pending request of `requester` on `owner`'s follower set.
pub fn reject_request(owner: &mut FollowerSet, requester: &mut FollowingSet) -> Transition {
    let owner_id = owner.owner_id.clone();
    let requester_id = requester.owner_id.clone();

    let had_request = owner.requests_for_follow.remove(&requester_id);
    let mirrored = requester.requesting_to_follow.remove(&owner_id);

    if !had_request && !mirrored {
        return Transition::quiet(Task::NoRequestForFollow);
    }

    Transition::with_events(
        Task::RejectFollow,
        vec![ConnectionEvent::FollowRejected {
            owner_id: requester_id,
            rejecter_id: owner_id,
        }],
    )
}

/// Drop `follower` from `owner`'s accepted followers.
pub fn remove_follower(owner: &mut FollowerSet, follower: &mut FollowingSet) -> Transition {
    let removed = owner.follower.remove(&follower.owner_id);
    let mirrored = follower.following.remove(&owner.owner_id);

    if removed || mirrored {
        Transition::quiet(Task::RemoveFollower)
    } else {
        Transition::quiet(Task::NotFollowing)
    }
}

/// Toggle `target_id` in the actor's muted list.
pub fn toggle_mute(actor: &mut MutedSet, target_id: &str) -> AppResult<Transition> {
    if actor.owner_id == target_id {
        return Err(AppError::SelfReference);
    }

    if actor.muted.remove(target_id) {
        return Ok(Transition::quiet(Task::Unmute));
    }
    actor.muted.insert(target_id);
    Ok(Transition::quiet(Task::Mute))
}

/// Toggle `target_id` in the actor's blocked list.
pub fn toggle_block(actor: &mut BlockedSet, target_id: &str) -> AppResult<Transition> {
    if actor.owner_id == target_id {
        return Err(AppError::SelfReference);
    }

    if actor.blocked.remove(target_id) {
        return Ok(Transition::quiet(Task::Unblock));
    }
    actor.blocked.insert(target_id);
    Ok(Transition::quiet(Task::Block))
}
