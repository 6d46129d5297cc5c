//! In-memory connection sets decoded from their stored rows.

use super::members::MemberList;
use bumblebee_common::{AppError, AppResult};
use bumblebee_db::entities::{blocked, follower, following, muted};

/// Users following the owner, plus inbound follow requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowerSet {
    /// Owning user.
    pub owner_id: String,
    /// Accepted followers.
    pub follower: MemberList,
    /// Pending inbound requests.
    pub requests_for_follow: MemberList,
}

/// Users the owner follows, plus outbound follow requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowingSet {
    /// Owning user.
    pub owner_id: String,
    /// Accepted followees.
    pub following: MemberList,
    /// Pending outbound requests.
    pub requesting_to_follow: MemberList,
}

/// Users the owner has muted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutedSet {
    /// Owning user.
    pub owner_id: String,
    /// Muted users.
    pub muted: MemberList,
}

/// Users the owner has blocked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedSet {
    /// Owning user.
    pub owner_id: String,
    /// Blocked users.
    pub blocked: MemberList,
}

impl FollowerSet {
    /// Empty set owned by `owner_id`.
    #[must_use]
    pub fn empty(owner_id: &str) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            follower: MemberList::new(),
            requests_for_follow: MemberList::new(),
        }
    }
}

impl FollowingSet {
    /// Empty set owned by `owner_id`.
    #[must_use]
    pub fn empty(owner_id: &str) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            following: MemberList::new(),
            requesting_to_follow: MemberList::new(),
        }
    }
}

impl MutedSet {
    /// Empty set owned by `owner_id`.
    #[must_use]
    pub fn empty(owner_id: &str) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            muted: MemberList::new(),
        }
    }
}

impl BlockedSet {
    /// Empty set owned by `owner_id`.
    #[must_use]
    pub fn empty(owner_id: &str) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            blocked: MemberList::new(),
        }
    }
}

impl TryFrom<follower::Model> for FollowerSet {
    type Error = AppError;

    fn try_from(model: follower::Model) -> AppResult<Self> {
        Ok(Self {
            follower: MemberList::from_json(&model.follower)?,
            requests_for_follow: MemberList::from_json(&model.requests_for_follow)?,
            owner_id: model.user_id,
        })
    }
}

impl TryFrom<following::Model> for FollowingSet {
    type Error = AppError;

    fn try_from(model: following::Model) -> AppResult<Self> {
        Ok(Self {
            following: MemberList::from_json(&model.following)?,
            requesting_to_follow: MemberList::from_json(&model.requesting_to_follow)?,
            owner_id: model.user_id,
        })
    }
}

impl TryFrom<muted::Model> for MutedSet {
    type Error = AppError;

    fn try_from(model: muted::Model) -> AppResult<Self> {
        Ok(Self {
            muted: MemberList::from_json(&model.muted)?,
            owner_id: model.user_id,
        })
    }
}

impl TryFrom<blocked::Model> for BlockedSet {
    type Error = AppError;

    fn try_from(model: blocked::Model) -> AppResult<Self> {
        Ok(Self {
            blocked: MemberList::from_json(&model.blocked)?,
            owner_id: model.user_id,
        })
    }
}
