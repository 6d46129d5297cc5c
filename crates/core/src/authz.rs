//! Authorization gate invoked at the top of every handler.

use bumblebee_common::{AppError, AppResult};
use bumblebee_db::entities::user;

/// What the caller must be allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability<'a> {
    /// Any signed-in, active user.
    Authenticated,
    /// Only the user with this id.
    IsOwner(&'a str),
}

/// Proof that a caller passed [`authorize`].
#[derive(Debug, Clone)]
pub struct Authorized {
    user: user::Model,
}

impl Authorized {
    /// The authorized user.
    #[must_use]
    pub const fn user(&self) -> &user::Model {
        &self.user
    }

    /// The authorized user's id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.user.id
    }
}

/// Check `caller` against `capability`.
pub fn authorize(caller: Option<&user::Model>, capability: Capability<'_>) -> AppResult<Authorized> {
    let user = match caller {
        Some(user) if user.is_active => user,
        _ => return Err(AppError::Unauthenticated),
    };

    if matches!(capability, Capability::IsOwner(owner_id) if user.id != owner_id) {
        return Err(AppError::PermissionDenied(
            "You do not have permission to perform this action".to_string(),
        ));
    }

    Ok(Authorized { user: user.clone() })
}
