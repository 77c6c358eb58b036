//! In-memory implementation of the AccountStore port.
//!
//! A map keyed by user id with a secondary unique index on email, both
//! behind one `RwLock`. Insertion checks the email index and writes the
//! user under the same write guard, so concurrent registrations with the
//! same email see exactly one success, the same guarantee the unique
//! index gives the PostgreSQL implementation.
//!
//! Used by tests and by local runs that don't want a database.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{DomainError, NewUser, User, UserId};
use crate::ports::AccountStore;

/// In-memory account store.
#[derive(Default)]
pub struct InMemoryAccountStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<UserId, User>,
    /// Unique index: email -> user id.
    by_email: HashMap<String, UserId>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn create(&self, new_user: NewUser) -> Result<User, DomainError> {
        let mut inner = self.inner.write().await;

        // Check and insert under the same write guard; this is the
        // in-memory equivalent of the database unique index.
        if inner.by_email.contains_key(&new_user.email) {
            return Err(DomainError::DuplicateEmail);
        }

        let user = User::create(new_user);
        inner.by_email.insert(user.email.clone(), user.id);
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_email
            .get(email)
            .and_then(|id| inner.users.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&id).cloned())
    }

    async fn set_paid_by_id(&self, id: UserId) -> Result<bool, DomainError> {
        let mut inner = self.inner.write().await;
        match inner.users.get_mut(&id) {
            Some(user) => {
                user.mark_paid();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_paid_by_email(&self, email: &str) -> Result<bool, DomainError> {
        let mut inner = self.inner.write().await;
        let id = match inner.by_email.get(email) {
            Some(id) => *id,
            None => return Ok(false),
        };
        match inner.users.get_mut(&id) {
            Some(user) => {
                user.mark_paid();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ana".to_string(),
            email: email.to_string(),
            password_hash: "$2b$10$hash".to_string(),
        }
    }

    #[tokio::test]
    async fn create_and_find_back() {
        let store = InMemoryAccountStore::new();

        let created = store.create(new_user("ana@example.com")).await.unwrap();

        let by_email = store.find_by_email("ana@example.com").await.unwrap();
        let by_id = store.find_by_id(created.id).await.unwrap();
        assert_eq!(by_email, Some(created.clone()));
        assert_eq!(by_id, Some(created));
    }

    #[tokio::test]
    async fn email_lookup_is_exact() {
        let store = InMemoryAccountStore::new();
        store.create(new_user("Ana@example.com")).await.unwrap();

        assert!(store.find_by_email("ana@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = InMemoryAccountStore::new();
        store.create(new_user("ana@example.com")).await.unwrap();

        let result = store.create(new_user("ana@example.com")).await;
        assert!(matches!(result, Err(DomainError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn concurrent_same_email_creates_exactly_one_user() {
        let store = Arc::new(InMemoryAccountStore::new());

        let a = {
            let store = store.clone();
            tokio::spawn(async move { store.create(new_user("race@example.com")).await })
        };
        let b = {
            let store = store.clone();
            tokio::spawn(async move { store.create(new_user("race@example.com")).await })
        };

        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
        let conflicts = [&a, &b]
            .iter()
            .filter(|r| matches!(r, Err(DomainError::DuplicateEmail)))
            .count();

        assert_eq!(successes, 1);
        assert_eq!(conflicts, 1);
    }

    #[tokio::test]
    async fn set_paid_by_id_is_idempotent() {
        let store = InMemoryAccountStore::new();
        let user = store.create(new_user("ana@example.com")).await.unwrap();

        assert!(store.set_paid_by_id(user.id).await.unwrap());
        assert!(store.set_paid_by_id(user.id).await.unwrap());

        let stored = store.find_by_id(user.id).await.unwrap().unwrap();
        assert!(stored.has_paid);
    }

    #[tokio::test]
    async fn set_paid_unknown_targets_report_no_match() {
        let store = InMemoryAccountStore::new();

        assert!(!store.set_paid_by_id(UserId::new()).await.unwrap());
        assert!(!store.set_paid_by_email("nobody@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_paid_writers_converge_without_error() {
        let store = Arc::new(InMemoryAccountStore::new());
        let user = store.create(new_user("ana@example.com")).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            let email = user.email.clone();
            handles.push(tokio::spawn(async move {
                store.set_paid_by_id(user.id).await.unwrap();
                store.set_paid_by_email(&email).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert!(store.find_by_id(user.id).await.unwrap().unwrap().has_paid);
    }
}
