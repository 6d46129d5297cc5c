//! User service: sign-up, sign-in, token authentication and privacy.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use bumblebee_common::{AppError, AppResult, IdGenerator};
use bumblebee_db::{
    entities::{user, user_profile},
    repositories::{UserProfileRepository, UserRepository},
};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[allow(clippy::unwrap_used)]
static USERNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").unwrap());

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    profile_repo: UserProfileRepository,
    id_gen: IdGenerator,
}

/// Input for signing up.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupInput {
    #[validate(
        length(min = 1, max = 150),
        regex(path = *USERNAME_RE, message = "may only contain letters, digits and underscores")
    )]
    pub username: String,

    #[validate(email, length(max = 150))]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Input for signing in.
#[derive(Debug, Deserialize, Validate)]
pub struct SigninInput {
    #[validate(length(min = 1))]
    pub username: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// A user together with their access token.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    /// The signed-in user.
    pub user: user::Model,
    /// Bearer token for subsequent requests.
    pub token: String,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, profile_repo: UserProfileRepository) -> Self {
        Self {
            user_repo,
            profile_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a user with an empty profile and empty connection sets.
    pub async fn signup(&self, input: SignupInput) -> AppResult<Session> {
        input.validate()?;

        if self.user_repo.find_by_username(&input.username).await?.is_some() {
            return Err(AppError::PreExistence(format!(
                "Username `{}` is already taken",
                input.username
            )));
        }

        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::PreExistence(
                "Email is already registered".to_string(),
            ));
        }

        let password_hash = hash_password(&input.password)?;
        let token = self.id_gen.generate_token();

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(input.username.clone()),
            username_lower: Set(input.username.to_lowercase()),
            email: Set(input.email.to_lowercase()),
            password: Set(password_hash),
            token: Set(Some(token.clone())),
            ..Default::default()
        };

        let user = self
            .user_repo
            .create_with_connections(model, user_profile::ActiveModel::default())
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User signed up");

        Ok(Session { user, token })
    }

    /// Verify credentials and return the user's token, issuing one if absent.
    pub async fn signin(&self, input: SigninInput) -> AppResult<Session> {
        input.validate()?;

        let user = self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .ok_or(AppError::Unauthenticated)?;

        if !user.is_active || !verify_password(&input.password, &user.password)? {
            return Err(AppError::Unauthenticated);
        }

        if let Some(token) = user.token.clone() {
            return Ok(Session { user, token });
        }

        let token = self.id_gen.generate_token();
        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(token.clone()));
        let user = self.user_repo.update(active).await?;

        Ok(Session { user, token })
    }

    /// Resolve a bearer token to its user.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthenticated)
    }

    /// Set whether the user's profile is private.
    pub async fn set_privacy(
        &self,
        user_id: &str,
        private: bool,
    ) -> AppResult<user_profile::Model> {
        let profile = self.profile_repo.set_private(user_id, private).await?;
        tracing::debug!(user_id = %user_id, private, "Updated profile privacy");
        Ok(profile)
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn test_user(id: &str, username: &str, password_hash: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            username_lower: username.to_lowercase(),
            email: format!("{username}@example.com"),
            password: password_hash.to_string(),
            token: Some("token".to_string()),
            is_active: true,
            email_verified: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(db: DatabaseConnection) -> UserService {
        let db = Arc::new(db);
        UserService::new(
            UserRepository::new(Arc::clone(&db)),
            UserProfileRepository::new(db),
        )
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_signup_validation() {
        let input = SignupInput {
            username: "bad name!".to_string(),
            email: "not-an-email".to_string(),
            password: "short".to_string(),
        };
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();

        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[tokio::test]
    async fn test_signup_duplicate_username() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_user("u1", "alice", "hash")]])
            .into_connection();

        let result = service(db)
            .signup(SignupInput {
                username: "Alice".to_string(),
                email: "alice2@example.com".to_string(),
                password: "password123".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::PreExistence(_))));
    }

    #[tokio::test]
    async fn test_signin_wrong_password() {
        let hash = hash_password("password123").unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_user("u1", "alice", &hash)]])
            .into_connection();

        let result = service(db)
            .signin(SigninInput {
                username: "alice".to_string(),
                password: "password124".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_signin_returns_existing_token() {
        let hash = hash_password("password123").unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_user("u1", "alice", &hash)]])
            .into_connection();

        let session = service(db)
            .signin(SigninInput {
                username: "alice".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(session.token, "token");
        assert_eq!(session.user.id, "u1");
    }

    #[tokio::test]
    async fn test_authenticate_by_unknown_token() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();

        let result = service(db).authenticate_by_token("nope").await;

        assert!(matches!(result, Err(AppError::Unauthenticated)));
    }
}
