//! CLI command implementations.

pub mod migrate;
pub mod seed;

use secrecy::SecretString;

/// Error for a missing database URL.
#[derive(Debug, thiserror::Error)]
#[error("SHOP_DATABASE_URL (or DATABASE_URL) not set")]
pub struct MissingDatabaseUrl;

/// Read `SHOP_DATABASE_URL`, falling back to `DATABASE_URL`.
///
/// Loads `.env` first if present.
///
/// # Errors
///
/// Returns `MissingDatabaseUrl` if neither variable is set.
pub fn database_url() -> Result<SecretString, MissingDatabaseUrl> {
    dotenvy::dotenv().ok();

    std::env::var("SHOP_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MissingDatabaseUrl)
}
