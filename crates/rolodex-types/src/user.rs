use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a user record.
///
/// Identifiers are the decimal rendering of the document counter at the time
/// the record was created. They are never reused, even after deletion.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap an arbitrary identifier string (e.g. a URL path segment).
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier allocated for counter value `n`.
    pub fn from_counter(n: u64) -> Self {
        Self(n.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A single user record.
///
/// The `id` is not part of the serialized body: records are stored keyed by
/// their id, and the key is written back into `id` when a document is loaded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(skip)]
    pub id: UserId,
    pub created_at: DateTime<Utc>,
    pub display_name: String,
    pub email: String,
}

impl User {
    pub fn new(
        id: UserId,
        created_at: DateTime<Utc>,
        display_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id,
            created_at,
            display_name: display_name.into(),
            email: email.into(),
        }
    }
}

/// Mapping from identifier to record. Every key equals its value's `id`.
pub type UserList = BTreeMap<UserId, User>;
