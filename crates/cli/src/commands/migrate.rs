//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! shop-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `SHOP_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Migrations live in `crates/server/migrations/` and are embedded at build
//! time:
//! ```text
//! migrations/
//! ├── 20260101000001_create_products.sql
//! └── 20260101000002_create_orders.sql
//! ```

use tracing::info;

use shop_server::db::{self, postgres::MIGRATOR};

use super::{MissingDatabaseUrl, database_url};

/// Errors from running migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error(transparent)]
    MissingEnvVar(#[from] MissingDatabaseUrl),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run every pending migration.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails, or
/// a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let database_url = database_url()?;

    info!("Connecting to shop database...");
    let pool = db::create_pool(&database_url, 1).await?;

    info!(migrations = MIGRATOR.iter().count(), "Running shop migrations...");
    MIGRATOR.run(&pool).await?;

    info!("Shop migrations complete!");
    Ok(())
}
