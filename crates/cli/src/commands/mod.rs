//! CLI command implementations.

pub mod admin;
pub mod migrate;

use sqlx::PgPool;
use thiserror::Error;

/// Errors shared by all CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("No account found for {0}")]
    UnknownAccount(String),
}

/// Connect to the marketplace database from the environment.
///
/// Reads `ATELIER_DATABASE_URL`, falling back to `DATABASE_URL`.
pub async fn connect() -> Result<PgPool, CliError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("ATELIER_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CliError::MissingEnvVar("ATELIER_DATABASE_URL"))?;

    Ok(PgPool::connect(&database_url).await?)
}
