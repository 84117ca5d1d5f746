use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::config::AppConfig;
use crate::users::repo::{PgUserStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        // Run migrations if present
        if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
            tracing::warn!(error = %e, "migrations folder not found or migration failed; continuing");
        }

        Ok(Self::with_store(Arc::new(PgUserStore::new(pool))))
    }

    /// Build state around any store implementation. Tests pass the in-memory
    /// store here.
    pub fn with_store(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }
}
