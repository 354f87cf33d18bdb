//! Dependency wiring
//!
//! Builds the pool, bootstraps the schema, and assembles the service
//! context every command runs against.

use std::sync::Arc;

use harvest_common::{AppConfig, AppError, AppResult};
use harvest_db::{create_pool, init_schema, DatabaseConfig, PgCursorRepository, PgPool, PgPostRepository};
use harvest_service::{HarvestSettings, ServiceContext, ServiceContextBuilder};
use harvest_source::{HttpMessageSource, SourceClientConfig};
use tracing::info;

/// Everything a command needs
pub struct Harvest {
    pub pool: PgPool,
    pub ctx: ServiceContext,
}

/// Initialize all dependencies
pub async fn bootstrap(config: &AppConfig) -> AppResult<Harvest> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&DatabaseConfig::from(&config.database))
        .await
        .map_err(AppError::database)?;
    init_schema(&pool).await.map_err(AppError::database)?;
    info!("PostgreSQL connection established");

    let source = HttpMessageSource::new(&SourceClientConfig::from(&config.source))?;
    info!(url = %config.source.url, "Message source configured");

    let ctx = ServiceContextBuilder::new()
        .cursor_repo(Arc::new(PgCursorRepository::new(pool.clone())))
        .post_repo(Arc::new(PgPostRepository::new(pool.clone())))
        .source(Arc::new(source))
        .settings(HarvestSettings::from(config))
        .build()?;

    Ok(Harvest { pool, ctx })
}
