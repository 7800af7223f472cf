use std::sync::Arc;

use tallyfolio_core::holdings::HoldingRepositoryTrait;
use tallyfolio_core::imports::{ImportService, ImportServiceTrait};
use tallyfolio_storage_sqlite::{
    create_pool, init, run_migrations, spawn_writer, HoldingRepository,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{Config, LogFormat};

pub struct AppState {
    pub user_id: String,
    pub holding_repository: Arc<dyn HoldingRepositoryTrait>,
    pub import_service: Arc<dyn ImportServiceTrait>,
}

/// Logs go to stderr so stdout stays valid JSON.
pub fn init_tracing(format: &LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

pub fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let db_path = init(&config.db_path)?;
    tracing::debug!("Database path in use: {}", db_path);

    let pool = create_pool(&db_path)?;
    run_migrations(&pool)?;
    let writer = spawn_writer((*pool).clone());

    let holding_repository: Arc<dyn HoldingRepositoryTrait> =
        Arc::new(HoldingRepository::new(pool, writer));
    let import_service = Arc::new(ImportService::new(holding_repository.clone()));

    Ok(AppState {
        user_id: config.user_id.clone(),
        holding_repository,
        import_service,
    })
}
