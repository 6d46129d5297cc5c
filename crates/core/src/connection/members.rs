//! Ordered, duplicate-free list of user ids.

use bumblebee_common::{AppError, AppResult};
use serde::Serialize;
use serde_json::Value;

/// Ordered set of user ids backing every connection list.
///
/// Insertion order is preserved and an id is stored at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MemberList(Vec<String>);

impl MemberList {
    /// Create an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Decode a stored JSON array, dropping repeated ids.
    pub fn from_json(value: &Value) -> AppResult<Self> {
        let items = value
            .as_array()
            .ok_or_else(|| AppError::Internal(format!("Member list is not an array: {value}")))?;

        let mut list = Self::new();
        for item in items {
            let id = item
                .as_str()
                .ok_or_else(|| AppError::Internal(format!("Member id is not a string: {item}")))?;
            list.insert(id);
        }
        Ok(list)
    }

    /// Whether `id` is a member.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|member| member == id)
    }

    /// Append `id`. Returns `false` if it was already present.
    pub fn insert(&mut self, id: &str) -> bool {
        if self.contains(id) {
            return false;
        }
        self.0.push(id.to_string());
        true
    }

    /// Remove `id`. Returns `false` if it was absent.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|member| member != id);
        self.0.len() != before
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Members in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Iterate over members in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl<'a> FromIterator<&'a str> for MemberList {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut list = Self::new();
        for id in iter {
            list.insert(id);
        }
        list
    }
}

impl<'a> IntoIterator for &'a MemberList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
