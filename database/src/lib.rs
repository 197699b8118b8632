// Storage layer for the subscription service.
// The `SubscriptionStore` trait is the seam the service depends on; PostgreSQL
// backs it in production and an in-memory map backs it in tests.

pub mod models;
pub mod repositories;

// Re-export commonly used items
pub use sqlx;
pub use repositories::{
    InMemorySubscriptionRepository, RepositoryError, SubscriptionRepository, SubscriptionStore,
};

use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;
use subtrack_config::DatabaseSettings;

/// Database connection manager
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Opens the pool and checks that the server answers.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self> {
        tracing::debug!(
            dsn = %settings.redacted_connection_string(),
            max_connections = settings.max_connections,
            "Creating database connection pool"
        );

        let options = PgConnectOptions::from_str(&settings.connection_string())
            .context("Invalid database connection settings")?;

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        let db = Self { pool };
        db.ping().await.context("Database ping failed")?;

        tracing::info!(host = %settings.host, database = %settings.name, "Database connection established");
        Ok(db)
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ping(&self) -> std::result::Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await.map(|_| ())
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run migrations")?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    pub fn subscriptions(&self) -> SubscriptionRepository {
        SubscriptionRepository::new(self.pool.clone())
    }
}
