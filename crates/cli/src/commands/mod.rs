//! Subcommand implementations.

pub mod balance;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;

/// Errors shared by the database-backed commands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Repository error: {0}")]
    Repository(#[from] stockbook_web::db::RepositoryError),
}

/// Load `.env`, read the database URL and open a small pool.
///
/// # Errors
///
/// Returns `CommandError::MissingEnvVar` if no URL is set, or the connection
/// error.
pub async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("STOCKBOOK_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("STOCKBOOK_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = stockbook_web::db::create_pool(&database_url, 2).await?;
    Ok(pool)
}
