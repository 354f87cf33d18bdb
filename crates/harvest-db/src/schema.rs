//! Schema bootstrap
//!
//! Every statement is idempotent, so running it on each startup is safe.

use sqlx::PgPool;
use tracing::info;

/// Initial schema: cursors, posts, messages, attachments
pub const INIT_SQL: &str = include_str!("../migrations/0001_init.sql");

/// Create any missing tables and indexes
pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(INIT_SQL).execute(pool).await?;
    info!("Database schema ready");
    Ok(())
}
