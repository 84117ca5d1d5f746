use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use super::repo_types::{NewUser, User};

/// Upper bound on a single store round trip.
const QUERY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),
    #[error("query timed out")]
    Timeout,
}

/// CRUD over the user table. A missing row is `Ok(None)` or an affected
/// count of 0; `StoreError` is reserved for transport and query faults.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Full scan, ordered by id.
    async fn list(&self) -> Result<Vec<User>, StoreError>;

    async fn get(&self, id: i64) -> Result<Option<User>, StoreError>;

    /// Used by login only.
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Insert the six mutable fields and return the row with its
    /// store-assigned id.
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;

    /// Full-row overwrite by id. Returns rows affected; 0 means no row
    /// matched and the caller decides what that means.
    async fn update(&self, id: i64, user: &NewUser) -> Result<u64, StoreError>;

    /// Returns rows affected, with the same 0-is-not-an-error contract as
    /// `update`.
    async fn delete(&self, id: i64) -> Result<u64, StoreError>;
}

/// The persistent implementation over a shared connection pool.
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn bounded<T, F>(fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(QUERY_TIMEOUT, fut).await {
        Ok(res) => Ok(res?),
        Err(_) => Err(StoreError::Timeout),
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn list(&self) -> Result<Vec<User>, StoreError> {
        bounded(
            sqlx::query_as::<_, User>(
                r#"
                SELECT id, name, email, password, wins, losses, draws
                FROM users
                ORDER BY id
                "#,
            )
            .fetch_all(&self.pool),
        )
        .await
    }

    async fn get(&self, id: i64) -> Result<Option<User>, StoreError> {
        bounded(
            sqlx::query_as::<_, User>(
                r#"
                SELECT id, name, email, password, wins, losses, draws
                FROM users
                WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        bounded(
            sqlx::query_as::<_, User>(
                r#"
                SELECT id, name, email, password, wins, losses, draws
                FROM users
                WHERE email = $1
                "#,
            )
            .bind(email)
            .fetch_optional(&self.pool),
        )
        .await
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        bounded(
            sqlx::query_as::<_, User>(
                r#"
                INSERT INTO users (name, email, password, wins, losses, draws)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, name, email, password, wins, losses, draws
                "#,
            )
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password)
            .bind(user.wins)
            .bind(user.losses)
            .bind(user.draws)
            .fetch_one(&self.pool),
        )
        .await
    }

    async fn update(&self, id: i64, user: &NewUser) -> Result<u64, StoreError> {
        let result = bounded(
            sqlx::query(
                r#"
                UPDATE users
                SET name = $2, email = $3, password = $4,
                    wins = $5, losses = $6, draws = $7
                WHERE id = $1
                "#,
            )
            .bind(id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password)
            .bind(user.wins)
            .bind(user.losses)
            .bind(user.draws)
            .execute(&self.pool),
        )
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, id: i64) -> Result<u64, StoreError> {
        let result = bounded(
            sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(id)
                .execute(&self.pool),
        )
        .await?;
        Ok(result.rows_affected())
    }
}
