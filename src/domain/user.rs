//! User entity and identifier.
//!
//! A user's payment state is a two-state machine: `unpaid` -> `paid`.
//! The transition is triggered by an approved webhook, a client confirm,
//! or an operator override, and is never reversed by any code path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a user.
///
/// Rendered as text this is also the `external_reference` stamped on every
/// payment preference, which is how a provider notification finds its way
/// back to the user it pays for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generates a new random user id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID (e.g. from a database row).
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Data required to create a user. The store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// bcrypt verifier; the plaintext is never stored.
    pub password_hash: String,
    /// Monotonic entitlement flag. Once `true`, stays `true`.
    pub has_paid: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates an unpaid user from registration data.
    pub fn create(new: NewUser) -> Self {
        Self {
            id: UserId::new(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            has_paid: false,
            created_at: Utc::now(),
        }
    }

    /// Transitions the paid flag to `true`.
    ///
    /// Returns whether the call changed anything. Safe to invoke any number
    /// of times; the flag only ever moves in one direction.
    pub fn mark_paid(&mut self) -> bool {
        let changed = !self.has_paid;
        self.has_paid = true;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User::create(NewUser {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password_hash: "$2b$10$hash".to_string(),
        })
    }

    #[test]
    fn new_user_starts_unpaid() {
        let user = test_user();
        assert!(!user.has_paid);
    }

    #[test]
    fn mark_paid_sets_flag_once() {
        let mut user = test_user();

        assert!(user.mark_paid());
        assert!(user.has_paid);

        // Repeat invocations are no-ops, never errors.
        assert!(!user.mark_paid());
        assert!(user.has_paid);
    }

    #[test]
    fn user_id_round_trips_through_text() {
        let id = UserId::new();
        let parsed: UserId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn user_id_rejects_garbage() {
        assert!("not-a-uuid".parse::<UserId>().is_err());
        assert!("".parse::<UserId>().is_err());
    }
}
