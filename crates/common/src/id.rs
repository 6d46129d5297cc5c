//! Identifier and token generation.

use ulid::Ulid;
use uuid::Uuid;

/// Generates user, notification and token identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdGenerator;

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Lowercase ULID, lexicographically sortable by creation time.
    ///
    /// Pagination with `until_id` relies on this ordering.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Random bearer token with no time component.
    #[must_use]
    pub fn generate_token(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}
