//! Connection service: follow, mute and block actions and their read side.

use crate::authz::{Authorized, Capability, authorize};
use crate::connection::{
    self, BlockedSet, FollowerSet, FollowingSet, MemberList, MutedSet, Task, Transition,
};
use crate::services::event_sink::{EventSinkService, dispatch};
use bumblebee_common::{AppError, AppResult};
use bumblebee_db::{
    entities::user,
    repositories::{ConnectionRepository, RowLock, UserProfileRepository, UserRepository},
};
use sea_orm::DatabaseTransaction;
use serde::Serialize;
use std::collections::HashMap;

/// Result of a connection action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    /// What happened.
    pub task: Task,
    /// Confirmation naming the other party.
    pub message: String,
}

impl ActionOutcome {
    fn new(task: Task, username: &str) -> Self {
        Self {
            task,
            message: task.message(username),
        }
    }
}

/// Public view of a user in connection listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    /// User ID.
    pub id: String,
    /// Username.
    pub username: String,
}

impl From<&user::Model> for UserSummary {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
        }
    }
}

/// Followers of a user.
#[derive(Debug, Clone, Serialize)]
pub struct FollowerListing {
    /// Owner of the listing.
    pub username: String,
    /// Accepted followers.
    pub follower: Vec<UserSummary>,
    /// Number of accepted followers.
    pub follower_count: usize,
    /// Pending inbound requests, shown to the owner only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests_for_follow: Option<Vec<UserSummary>>,
}

/// Users a user follows.
#[derive(Debug, Clone, Serialize)]
pub struct FollowingListing {
    /// Owner of the listing.
    pub username: String,
    /// Accepted followees.
    pub following: Vec<UserSummary>,
    /// Number of accepted followees.
    pub following_count: usize,
    /// Pending outbound requests, shown to the owner only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requesting_to_follow: Option<Vec<UserSummary>>,
}

/// Follower and following lists, plus muted and blocked for the owner.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionsListing {
    /// Owner of the listing.
    pub username: String,
    /// Accepted followers.
    pub follower: Vec<UserSummary>,
    /// Number of accepted followers.
    pub follower_count: usize,
    /// Accepted followees.
    pub following: Vec<UserSummary>,
    /// Number of accepted followees.
    pub following_count: usize,
    /// Muted users, owner only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muted: Option<Vec<UserSummary>>,
    /// Number of muted users, owner only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muted_count: Option<usize>,
    /// Blocked users, owner only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked: Option<Vec<UserSummary>>,
    /// Number of blocked users, owner only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked_count: Option<usize>,
}

/// A single list with its size.
#[derive(Debug, Clone, Serialize)]
pub struct UserListing {
    /// Users in list order.
    pub users: Vec<UserSummary>,
    /// Number of users.
    pub count: usize,
}

/// Users resolved from a list of ids.
#[derive(Debug, Clone, Serialize)]
pub struct LookupResult {
    /// Users that exist, in request order.
    pub connections: Vec<UserSummary>,
    /// Requested ids with no matching user.
    pub non_existing: Vec<String>,
}

/// Connection service for business logic.
#[derive(Clone)]
pub struct ConnectionService {
    connection_repo: ConnectionRepository,
    user_repo: UserRepository,
    profile_repo: UserProfileRepository,
    event_sink: Option<EventSinkService>,
}

impl ConnectionService {
    /// Create a new connection service.
    #[must_use]
    pub const fn new(
        connection_repo: ConnectionRepository,
        user_repo: UserRepository,
        profile_repo: UserProfileRepository,
    ) -> Self {
        Self {
            connection_repo,
            user_repo,
            profile_repo,
            event_sink: None,
        }
    }

    /// Set the sink that receives events from committed actions.
    pub fn set_event_sink(&mut self, event_sink: EventSinkService) {
        self.event_sink = Some(event_sink);
    }

    // ==================== Actions ====================

    /// Follow, unfollow, request or cancel a request, depending on state.
    pub async fn toggle_follow(
        &self,
        actor: &Authorized,
        username: &str,
    ) -> AppResult<ActionOutcome> {
        let target = self.user_repo.get_by_username(username).await?;
        if target.id == actor.id() {
            return Err(AppError::SelfReference);
        }

        let private = self.profile_repo.is_private(&target.id).await?;

        let transition = self
            .apply_to_pair(&target.id, actor.id(), |target_set, actor_set| {
                connection::toggle_follow(actor_set, target_set, private)
            })
            .await?;

        tracing::debug!(
            actor_id = %actor.id(),
            target_id = %target.id,
            task = %transition.task,
            "Applied follow toggle"
        );

        self.finish(transition, &target.username).await
    }

    /// Accept a pending follow request made by `username`.
    ///
    /// The follower set is loaded by the caller's id, so only its owner can
    /// accept requests on it. The same holds for reject and remove.
    pub async fn accept_follow(
        &self,
        owner: &Authorized,
        username: &str,
    ) -> AppResult<ActionOutcome> {
        let requester = self.user_repo.get_by_username(username).await?;

        let transition = self
            .apply_to_pair(owner.id(), &requester.id, connection::accept_request)
            .await?;

        self.finish(transition, &requester.username).await
    }

    /// Reject a pending follow request made by `username`.
    pub async fn reject_follow(
        &self,
        owner: &Authorized,
        username: &str,
    ) -> AppResult<ActionOutcome> {
        let requester = self.user_repo.get_by_username(username).await?;

        let transition = self
            .apply_to_pair(owner.id(), &requester.id, |owner_set, requester_set| {
                Ok(connection::reject_request(owner_set, requester_set))
            })
            .await?;

        self.finish(transition, &requester.username).await
    }

    /// Drop `username` from the owner's followers.
    pub async fn remove_follower(
        &self,
        owner: &Authorized,
        username: &str,
    ) -> AppResult<ActionOutcome> {
        let follower = self.user_repo.get_by_username(username).await?;

        let transition = self
            .apply_to_pair(owner.id(), &follower.id, |owner_set, follower_set| {
                Ok(connection::remove_follower(owner_set, follower_set))
            })
            .await?;

        self.finish(transition, &follower.username).await
    }

    /// Mute or unmute `username`.
    pub async fn toggle_mute(&self, actor: &Authorized, username: &str) -> AppResult<ActionOutcome> {
        let target = self.user_repo.get_by_username(username).await?;

        let txn = self.connection_repo.begin().await?;
        let mut set = MutedSet::try_from(
            self.connection_repo
                .load_muted(&txn, actor.id(), RowLock::Exclusive)
                .await?,
        )?;

        let transition = connection::toggle_mute(&mut set, &target.id)?;

        self.connection_repo
            .save_muted(&txn, &set.owner_id, set.muted.as_slice())
            .await?;
        commit(txn).await?;

        self.finish(transition, &target.username).await
    }

    /// Block or unblock `username`.
    pub async fn toggle_block(
        &self,
        actor: &Authorized,
        username: &str,
    ) -> AppResult<ActionOutcome> {
        let target = self.user_repo.get_by_username(username).await?;

        let txn = self.connection_repo.begin().await?;
        let mut set = BlockedSet::try_from(
            self.connection_repo
                .load_blocked(&txn, actor.id(), RowLock::Exclusive)
                .await?,
        )?;

        let transition = connection::toggle_block(&mut set, &target.id)?;

        self.connection_repo
            .save_blocked(&txn, &set.owner_id, set.blocked.as_slice())
            .await?;
        commit(txn).await?;

        self.finish(transition, &target.username).await
    }

    /// Lock the follower set of `follower_owner` and the following set of
    /// `following_owner`, apply `apply`, and persist both if it changed them.
    ///
    /// Follower rows are always locked before following rows so that
    /// crossing actions on the same pair cannot deadlock.
    async fn apply_to_pair<F>(
        &self,
        follower_owner: &str,
        following_owner: &str,
        apply: F,
    ) -> AppResult<Transition>
    where
        F: FnOnce(&mut FollowerSet, &mut FollowingSet) -> AppResult<Transition>,
    {
        let txn = self.connection_repo.begin().await?;

        let mut follower_set = FollowerSet::try_from(
            self.connection_repo
                .load_follower(&txn, follower_owner, RowLock::Exclusive)
                .await?,
        )?;
        let mut following_set = FollowingSet::try_from(
            self.connection_repo
                .load_following(&txn, following_owner, RowLock::Exclusive)
                .await?,
        )?;

        let transition = apply(&mut follower_set, &mut following_set)?;

        if transition.task.mutates() {
            self.connection_repo
                .save_follower(
                    &txn,
                    &follower_set.owner_id,
                    follower_set.follower.as_slice(),
                    follower_set.requests_for_follow.as_slice(),
                )
                .await?;
            self.connection_repo
                .save_following(
                    &txn,
                    &following_set.owner_id,
                    following_set.following.as_slice(),
                    following_set.requesting_to_follow.as_slice(),
                )
                .await?;
        }

        commit(txn).await?;
        Ok(transition)
    }

    async fn finish(&self, transition: Transition, username: &str) -> AppResult<ActionOutcome> {
        dispatch(self.event_sink.as_ref(), &transition.events).await;
        Ok(ActionOutcome::new(transition.task, username))
    }

    // ==================== Queries ====================

    /// Followers of `username`.
    pub async fn get_followers(
        &self,
        caller: Option<&user::Model>,
        username: &str,
    ) -> AppResult<FollowerListing> {
        let (target, is_owner) = self.visible_target(caller, username).await?;
        let set = FollowerSet::try_from(self.connection_repo.get_follower(&target.id).await?)?;

        let follower = self.resolve(&set.follower).await?;
        let requests_for_follow = if is_owner {
            Some(self.resolve(&set.requests_for_follow).await?)
        } else {
            None
        };

        Ok(FollowerListing {
            username: target.username,
            follower_count: follower.len(),
            follower,
            requests_for_follow,
        })
    }

    /// Users `username` follows.
    pub async fn get_following(
        &self,
        caller: Option<&user::Model>,
        username: &str,
    ) -> AppResult<FollowingListing> {
        let (target, is_owner) = self.visible_target(caller, username).await?;
        let set = FollowingSet::try_from(self.connection_repo.get_following(&target.id).await?)?;

        let following = self.resolve(&set.following).await?;
        let requesting_to_follow = if is_owner {
            Some(self.resolve(&set.requesting_to_follow).await?)
        } else {
            None
        };

        Ok(FollowingListing {
            username: target.username,
            following_count: following.len(),
            following,
            requesting_to_follow,
        })
    }

    /// Followers and followees of `username`; muted and blocked for the owner.
    pub async fn get_connections(
        &self,
        caller: Option<&user::Model>,
        username: &str,
    ) -> AppResult<ConnectionsListing> {
        let (target, is_owner) = self.visible_target(caller, username).await?;

        let followers = FollowerSet::try_from(self.connection_repo.get_follower(&target.id).await?)?;
        let following =
            FollowingSet::try_from(self.connection_repo.get_following(&target.id).await?)?;

        let follower = self.resolve(&followers.follower).await?;
        let following = self.resolve(&following.following).await?;

        let (muted, blocked) = if is_owner {
            let muted = MutedSet::try_from(self.connection_repo.get_muted(&target.id).await?)?;
            let blocked =
                BlockedSet::try_from(self.connection_repo.get_blocked(&target.id).await?)?;
            (
                Some(self.resolve(&muted.muted).await?),
                Some(self.resolve(&blocked.blocked).await?),
            )
        } else {
            (None, None)
        };

        Ok(ConnectionsListing {
            username: target.username,
            follower_count: follower.len(),
            follower,
            following_count: following.len(),
            following,
            muted_count: muted.as_ref().map(Vec::len),
            muted,
            blocked_count: blocked.as_ref().map(Vec::len),
            blocked,
        })
    }

    /// The caller's muted users.
    pub async fn get_muted(&self, caller: &Authorized) -> AppResult<UserListing> {
        let set = MutedSet::try_from(self.connection_repo.get_muted(caller.id()).await?)?;
        self.listing(&set.muted).await
    }

    /// The caller's blocked users.
    pub async fn get_blocked(&self, caller: &Authorized) -> AppResult<UserListing> {
        let set = BlockedSet::try_from(self.connection_repo.get_blocked(caller.id()).await?)?;
        self.listing(&set.blocked).await
    }

    /// Resolve user ids to summaries, reporting ids that do not exist.
    pub async fn lookup_users(&self, ids: &[String]) -> AppResult<LookupResult> {
        if ids.is_empty() {
            return Err(AppError::MissingField("connection_userid_list".to_string()));
        }

        let requested: MemberList = ids.iter().map(String::as_str).collect();
        let found = self.user_repo.find_by_ids(requested.as_slice()).await?;
        let by_id: HashMap<&str, &user::Model> =
            found.iter().map(|u| (u.id.as_str(), u)).collect();

        let mut connections = Vec::new();
        let mut non_existing = Vec::new();
        for id in &requested {
            match by_id.get(id.as_str()) {
                Some(user) => connections.push(UserSummary::from(*user)),
                None => non_existing.push(id.clone()),
            }
        }

        Ok(LookupResult {
            connections,
            non_existing,
        })
    }

    /// Resolve `username` and check the caller may see its connections.
    ///
    /// Returns the user and whether the caller owns it.
    async fn visible_target(
        &self,
        caller: Option<&user::Model>,
        username: &str,
    ) -> AppResult<(user::Model, bool)> {
        let target = self.user_repo.get_by_username(username).await?;
        let is_owner = authorize(caller, Capability::IsOwner(&target.id)).is_ok();

        if !is_owner && self.profile_repo.is_private(&target.id).await? {
            return Err(AppError::PermissionDenied(format!(
                "Connections of @{} are private",
                target.username
            )));
        }

        Ok((target, is_owner))
    }

    async fn listing(&self, members: &MemberList) -> AppResult<UserListing> {
        let users = self.resolve(members).await?;
        Ok(UserListing {
            count: users.len(),
            users,
        })
    }

    /// Resolve member ids in list order, skipping ids of deleted users.
    async fn resolve(&self, members: &MemberList) -> AppResult<Vec<UserSummary>> {
        let found = self.user_repo.find_by_ids(members.as_slice()).await?;
        let by_id: HashMap<&str, &user::Model> =
            found.iter().map(|u| (u.id.as_str(), u)).collect();

        Ok(members
            .iter()
            .filter_map(|id| by_id.get(id.as_str()).map(|u| UserSummary::from(*u)))
            .collect())
    }
}

async fn commit(txn: DatabaseTransaction) -> AppResult<()> {
    txn.commit()
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::connection::ConnectionEvent;
    use crate::services::event_sink::EventSink;
    use async_trait::async_trait;
    use bumblebee_db::entities::{blocked, follower, following, muted, user_profile};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            username_lower: username.to_lowercase(),
            email: format!("{username}@example.com"),
            password: "hash".to_string(),
            token: None,
            is_active: true,
            email_verified: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_profile(user_id: &str, private: bool) -> user_profile::Model {
        user_profile::Model {
            user_id: user_id.to_string(),
            name: None,
            nickname: None,
            bio: None,
            location: None,
            private,
            account_verified: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn follower_row(user_id: &str, follower: &[&str], pending: &[&str]) -> follower::Model {
        follower::Model {
            user_id: user_id.to_string(),
            follower: json!(follower),
            requests_for_follow: json!(pending),
            updated_at: None,
        }
    }

    fn following_row(user_id: &str, following: &[&str], pending: &[&str]) -> following::Model {
        following::Model {
            user_id: user_id.to_string(),
            following: json!(following),
            requesting_to_follow: json!(pending),
            updated_at: None,
        }
    }

    fn muted_row(user_id: &str, muted: &[&str]) -> muted::Model {
        muted::Model {
            user_id: user_id.to_string(),
            muted: json!(muted),
            updated_at: None,
        }
    }

    fn blocked_row(user_id: &str, blocked: &[&str]) -> blocked::Model {
        blocked::Model {
            user_id: user_id.to_string(),
            blocked: json!(blocked),
            updated_at: None,
        }
    }

    fn service(db: DatabaseConnection) -> ConnectionService {
        let db = Arc::new(db);
        ConnectionService::new(
            ConnectionRepository::new(Arc::clone(&db)),
            UserRepository::new(Arc::clone(&db)),
            UserProfileRepository::new(db),
        )
    }

    fn authorized(user: &user::Model) -> Authorized {
        authorize(Some(user), Capability::Authenticated).unwrap()
    }

    #[derive(Default)]
    struct RecordingSink {
        seen: Mutex<Vec<ConnectionEvent>>,
    }

    #[async_trait]
    impl EventSink for RecordingSink {
        async fn deliver(&self, event: &ConnectionEvent) -> AppResult<()> {
            self.seen.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_follow_public_user() {
        let alice = test_user("a", "alice");
        let bob = test_user("b", "bob");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[bob.clone()]])
            .append_query_results([[test_profile("b", false)]])
            .append_query_results([[follower_row("b", &[], &[])]])
            .append_query_results([[following_row("a", &[], &[])]])
            .append_query_results([[follower_row("b", &["a"], &[])]])
            .append_query_results([[following_row("a", &["b"], &[])]])
            .into_connection();

        let sink = Arc::new(RecordingSink::default());
        let mut service = service(db);
        service.set_event_sink(sink.clone());

        let outcome = service.toggle_follow(&authorized(&alice), "bob").await.unwrap();

        assert_eq!(outcome.task, Task::Follow);
        assert_eq!(outcome.message, "Successfully Follow @bob");
        assert_eq!(
            *sink.seen.lock().unwrap(),
            vec![ConnectionEvent::NewFollower {
                owner_id: "b".to_string(),
                follower_id: "a".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_follow_private_user_sends_request() {
        let alice = test_user("a", "alice");
        let carol = test_user("c", "carol");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[carol.clone()]])
            .append_query_results([[test_profile("c", true)]])
            .append_query_results([[follower_row("c", &[], &[])]])
            .append_query_results([[following_row("a", &[], &[])]])
            .append_query_results([[follower_row("c", &[], &["a"])]])
            .append_query_results([[following_row("a", &[], &["c"])]])
            .into_connection();

        let outcome = service(db)
            .toggle_follow(&authorized(&alice), "carol")
            .await
            .unwrap();

        assert_eq!(outcome.task, Task::RequestFollow);
        assert_eq!(outcome.message, "Successfully Request Follow @carol");
    }

    #[tokio::test]
    async fn test_follow_self_is_rejected() {
        let alice = test_user("a", "alice");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[alice.clone()]])
            .into_connection();

        let result = service(db).toggle_follow(&authorized(&alice), "alice").await;

        assert!(matches!(result, Err(AppError::SelfReference)));
    }

    #[tokio::test]
    async fn test_follow_unknown_user_is_not_found() {
        let alice = test_user("a", "alice");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();

        let result = service(db).toggle_follow(&authorized(&alice), "ghost").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_accept_follow() {
        let alice = test_user("a", "alice");
        let carol = test_user("c", "carol");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[alice.clone()]])
            .append_query_results([[follower_row("c", &[], &["a"])]])
            .append_query_results([[following_row("a", &[], &["c"])]])
            .append_query_results([[follower_row("c", &["a"], &[])]])
            .append_query_results([[following_row("a", &["c"], &[])]])
            .into_connection();

        let outcome = service(db)
            .accept_follow(&authorized(&carol), "alice")
            .await
            .unwrap();

        assert_eq!(outcome.task, Task::AcceptFollow);
        assert_eq!(outcome.task.as_str(), "follow");
        assert_eq!(outcome.message, "Successfully accepted @alice for follow");
    }

    #[tokio::test]
    async fn test_reject_without_request_skips_writes() {
        let alice = test_user("a", "alice");
        let carol = test_user("c", "carol");

        // No update results queued: a write would fail the mock.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[alice.clone()]])
            .append_query_results([[follower_row("c", &[], &[])]])
            .append_query_results([[following_row("a", &[], &[])]])
            .into_connection();

        let outcome = service(db)
            .reject_follow(&authorized(&carol), "alice")
            .await
            .unwrap();

        assert_eq!(outcome.task, Task::NoRequestForFollow);
        assert_eq!(
            outcome.message,
            "User @alice has not requested to follow you."
        );
    }

    #[tokio::test]
    async fn test_toggle_mute() {
        let alice = test_user("a", "alice");
        let bob = test_user("b", "bob");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[bob.clone()]])
            .append_query_results([[muted::Model {
                user_id: "a".to_string(),
                muted: json!([]),
                updated_at: None,
            }]])
            .append_query_results([[muted::Model {
                user_id: "a".to_string(),
                muted: json!(["b"]),
                updated_at: None,
            }]])
            .into_connection();

        let outcome = service(db)
            .toggle_mute(&authorized(&alice), "bob")
            .await
            .unwrap();

        assert_eq!(outcome.task, Task::Mute);
        assert_eq!(outcome.message, "Successfully Mute @bob");
    }

    #[tokio::test]
    async fn test_private_followers_hidden_from_others() {
        let alice = test_user("a", "alice");
        let carol = test_user("c", "carol");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[carol.clone()]])
            .append_query_results([[test_profile("c", true)]])
            .into_connection();

        let result = service(db).get_followers(Some(&alice), "carol").await;

        assert!(matches!(result, Err(AppError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn test_owner_sees_pending_requests() {
        let alice = test_user("a", "alice");
        let carol = test_user("c", "carol");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[carol.clone()]])
            .append_query_results([[follower_row("c", &[], &["a"])]])
            .append_query_results([[alice.clone()]])
            .into_connection();

        let listing = service(db)
            .get_followers(Some(&carol), "carol")
            .await
            .unwrap();

        assert_eq!(listing.follower_count, 0);
        let pending = listing.requests_for_follow.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].username, "alice");
    }

    #[tokio::test]
    async fn test_public_following_hides_pending_from_others() {
        let alice = test_user("a", "alice");
        let bob = test_user("b", "bob");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[bob.clone()]])
            .append_query_results([[test_profile("b", false)]])
            .append_query_results([[following_row("b", &["a"], &["x"])]])
            .append_query_results([[alice.clone()]])
            .into_connection();

        let listing = service(db)
            .get_following(Some(&alice), "bob")
            .await
            .unwrap();

        assert_eq!(listing.following_count, 1);
        assert_eq!(listing.following[0].id, "a");
        assert!(listing.requesting_to_follow.is_none());
    }

    #[tokio::test]
    async fn test_lookup_reports_missing_ids() {
        let alice = test_user("a", "alice");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[alice.clone()]])
            .into_connection();

        let result = service(db)
            .lookup_users(&["a".to_string(), "zzz".to_string()])
            .await
            .unwrap();

        assert_eq!(result.connections.len(), 1);
        assert_eq!(result.connections[0].username, "alice");
        assert_eq!(result.non_existing, vec!["zzz".to_string()]);
    }

    #[tokio::test]
    async fn test_lookup_requires_ids() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = service(db).lookup_users(&[]).await;

        assert!(matches!(result, Err(AppError::MissingField(_))));
    }

    #[tokio::test]
    async fn test_toggle_block() {
        let alice = test_user("a", "alice");
        let bob = test_user("b", "bob");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[bob.clone()]])
            .append_query_results([[blocked_row("a", &["b"])]])
            .append_query_results([[blocked_row("a", &[])]])
            .into_connection();

        let outcome = service(db)
            .toggle_block(&authorized(&alice), "bob")
            .await
            .unwrap();

        assert_eq!(outcome.task, Task::Unblock);
        assert_eq!(outcome.message, "Successfully Unblock @bob");
    }

    #[tokio::test]
    async fn test_block_self_is_rejected() {
        let alice = test_user("a", "alice");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[alice.clone()]])
            .append_query_results([[blocked_row("a", &[])]])
            .into_connection();

        let result = service(db).toggle_block(&authorized(&alice), "alice").await;

        assert!(matches!(result, Err(AppError::SelfReference)));
    }

    #[tokio::test]
    async fn test_remove_follower() {
        let alice = test_user("a", "alice");
        let bob = test_user("b", "bob");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[alice.clone()]])
            .append_query_results([[follower_row("b", &["a"], &[])]])
            .append_query_results([[following_row("a", &["b"], &[])]])
            .append_query_results([[follower_row("b", &[], &[])]])
            .append_query_results([[following_row("a", &[], &[])]])
            .into_connection();

        let sink = Arc::new(RecordingSink::default());
        let mut service = service(db);
        service.set_event_sink(sink.clone());

        let outcome = service
            .remove_follower(&authorized(&bob), "alice")
            .await
            .unwrap();

        assert_eq!(outcome.task, Task::RemoveFollower);
        assert_eq!(outcome.message, "Successfully removed follower @alice");
        assert!(sink.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_non_follower_skips_writes() {
        let alice = test_user("a", "alice");
        let bob = test_user("b", "bob");

        // No update results queued: a write would fail the mock.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[alice.clone()]])
            .append_query_results([[follower_row("b", &[], &[])]])
            .append_query_results([[following_row("a", &[], &[])]])
            .into_connection();

        let outcome = service(db)
            .remove_follower(&authorized(&bob), "alice")
            .await
            .unwrap();

        assert_eq!(outcome.task, Task::NotFollowing);
        assert_eq!(outcome.message, "User @alice is not following you.");
    }

    #[tokio::test]
    async fn test_owner_connections_include_muted_and_blocked() {
        let alice = test_user("a", "alice");
        let bob = test_user("b", "bob");
        let dave = test_user("d", "dave");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[alice.clone()]])
            .append_query_results([[follower_row("a", &["b"], &[])]])
            .append_query_results([[following_row("a", &[], &[])]])
            .append_query_results([[bob.clone()]])
            .append_query_results([[muted_row("a", &["d"])]])
            .append_query_results([[blocked_row("a", &[])]])
            .append_query_results([[dave.clone()]])
            .into_connection();

        let listing = service(db)
            .get_connections(Some(&alice), "alice")
            .await
            .unwrap();

        assert_eq!(listing.follower_count, 1);
        assert_eq!(listing.follower[0].username, "bob");
        assert_eq!(listing.following_count, 0);
        assert_eq!(listing.muted_count, Some(1));
        assert_eq!(listing.muted.unwrap()[0].username, "dave");
        assert_eq!(listing.blocked_count, Some(0));
        assert_eq!(listing.blocked, Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_connections_hide_muted_and_blocked_from_others() {
        let alice = test_user("a", "alice");
        let bob = test_user("b", "bob");

        // Muted and blocked rows are never read for another viewer.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[alice.clone()]])
            .append_query_results([[test_profile("a", false)]])
            .append_query_results([[follower_row("a", &[], &[])]])
            .append_query_results([[following_row("a", &["b"], &[])]])
            .append_query_results([[bob.clone()]])
            .into_connection();

        let listing = service(db)
            .get_connections(Some(&bob), "alice")
            .await
            .unwrap();

        assert_eq!(listing.following_count, 1);
        assert!(listing.muted.is_none());
        assert!(listing.muted_count.is_none());
        assert!(listing.blocked.is_none());
        assert!(listing.blocked_count.is_none());

        let body = serde_json::to_value(&listing).unwrap();
        assert!(body.get("muted").is_none());
        assert!(body.get("blocked_count").is_none());
    }
}
