//! Account store port - durable record of users and their paid flag.
//!
//! # Contract
//!
//! - Email uniqueness is enforced by the implementation's storage primitive
//!   (unique index, keyed insert), never by a check-then-insert in the
//!   caller: two concurrent `create` calls with the same email must yield
//!   exactly one success and one `DuplicateEmail`.
//! - `set_paid_*` is an unconditional single-row set of the monotonic flag.
//!   No implementation may read the current value and write a computed one;
//!   concurrent writers for the same user must all succeed and converge on
//!   `has_paid = true`.

use async_trait::async_trait;

use crate::domain::{DomainError, NewUser, User, UserId};

/// Port for user persistence.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Creates a user, assigning id and creation timestamp.
    ///
    /// Returns `DomainError::DuplicateEmail` when the email is taken.
    async fn create(&self, new_user: NewUser) -> Result<User, DomainError>;

    /// Looks up a user by exact email (no normalization).
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Looks up a user by id.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DomainError>;

    /// Sets `has_paid = true` for the given user.
    ///
    /// Returns whether a row matched; an already-paid user still matches
    /// (the update is a no-op, not an error).
    async fn set_paid_by_id(&self, id: UserId) -> Result<bool, DomainError>;

    /// Sets `has_paid = true` for the user with the given email.
    async fn set_paid_by_email(&self, email: &str) -> Result<bool, DomainError>;
}
