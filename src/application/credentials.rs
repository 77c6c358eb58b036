//! Credential service - registration and login against the account store.
//!
//! Hash-and-compare only; there is no session or token state. Each login is
//! a single credential check against the stored bcrypt verifier.

use std::sync::Arc;

use crate::domain::{DomainError, NewUser, User};
use crate::ports::AccountStore;

/// bcrypt cost factor.
const BCRYPT_COST: u32 = 10;

/// Registration and login use cases.
pub struct CredentialService {
    store: Arc<dyn AccountStore>,
}

impl CredentialService {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Registers a new user.
    ///
    /// The plaintext password is hashed with bcrypt before it reaches the
    /// store. Email uniqueness is enforced by the store itself, so two
    /// concurrent registrations with the same email cannot both succeed.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::missing("name"));
        }
        if email.trim().is_empty() {
            return Err(DomainError::missing("email"));
        }
        if password.is_empty() {
            return Err(DomainError::missing("password"));
        }

        let password_hash = bcrypt::hash(password, BCRYPT_COST)
            .map_err(|e| DomainError::Storage(format!("password hashing failed: {e}")))?;

        let user = self
            .store
            .create(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %user.id, email = %user.email, "user registered");
        Ok(user)
    }

    /// Authenticates a user by email and password.
    ///
    /// Unknown email and wrong password both return `InvalidCredentials`;
    /// the response must not reveal which of the two failed.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, DomainError> {
        if email.trim().is_empty() {
            return Err(DomainError::missing("email"));
        }
        if password.is_empty() {
            return Err(DomainError::missing("password"));
        }

        let user = match self.store.find_by_email(email).await? {
            Some(user) => user,
            None => {
                tracing::debug!("login attempt for unknown email");
                return Err(DomainError::InvalidCredentials);
            }
        };

        let matches = bcrypt::verify(password, &user.password_hash)
            .map_err(|e| DomainError::Storage(format!("stored verifier unreadable: {e}")))?;

        if !matches {
            tracing::debug!(user_id = %user.id, "login attempt with wrong password");
            return Err(DomainError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "user logged in");
        Ok(user)
    }
}
