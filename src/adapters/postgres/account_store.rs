//! PostgreSQL implementation of the AccountStore port.
//!
//! Uses sqlx for type-safe database operations with connection pooling.
//! Email uniqueness is the `users_email_key` unique index; the paid flag
//! is written with unconditional single-row UPDATEs, so concurrent
//! writers for the same user serialize in the database and all converge
//! on `has_paid = TRUE`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{DomainError, NewUser, User, UserId};
use crate::ports::AccountStore;

/// PostgreSQL account store.
pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    /// Creates a new store with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a user.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    has_paid: bool,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId::from_uuid(row.id),
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            has_paid: row.has_paid,
            created_at: row.created_at,
        }
    }
}

fn storage_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::Storage(format!("{context}: {e}"))
}

#[async_trait]
impl AccountStore for PostgresAccountStore {
    async fn create(&self, new_user: NewUser) -> Result<User, DomainError> {
        let user = User::create(new_user);

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, has_paid, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.has_paid)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("users_email_key") {
                    return DomainError::DuplicateEmail;
                }
            }
            storage_error("failed to create user", e)
        })?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, name, email, password_hash, has_paid, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("failed to find user by email", e))?;

        Ok(row.map(User::from))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, name, email, password_hash, has_paid, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("failed to find user by id", e))?;

        Ok(row.map(User::from))
    }

    async fn set_paid_by_id(&self, id: UserId) -> Result<bool, DomainError> {
        // Unconditional single-row set; an already-paid row still matches.
        let result = sqlx::query("UPDATE users SET has_paid = TRUE WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("failed to set paid flag", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_paid_by_email(&self, email: &str) -> Result<bool, DomainError> {
        let result = sqlx::query("UPDATE users SET has_paid = TRUE WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("failed to set paid flag", e))?;

        Ok(result.rows_affected() > 0)
    }
}
