use std::sync::Arc;

use axum::Router;
use okrbot_core::config::{AppConfig, ConfigError, LoadOptions};
use okrbot_core::engine::SubscriptionEngine;
use okrbot_core::hierarchy::HierarchyResolver;
use okrbot_core::stores::{CatalogStore, SubscriptionStore};
use okrbot_db::repositories::{SqlCatalogStore, SqlSubscriptionStore};
use okrbot_db::{connect, migrations, DbPool};
use okrbot_slack::commands::EngineCommandService;
use okrbot_slack::notifier::{NoopNotifier, Notifier, WebApiNotifier};
use thiserror::Error;
use tracing::info;

use crate::{health, slash};

#[derive(Debug)]
pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub router: Router,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let catalog: Arc<dyn CatalogStore> = Arc::new(SqlCatalogStore::new(db_pool.clone()));
    let subscriptions: Arc<dyn SubscriptionStore> =
        Arc::new(SqlSubscriptionStore::new(db_pool.clone()));
    let notifier: Arc<dyn Notifier> = if config.slack.is_configured() {
        Arc::new(WebApiNotifier::new(config.slack.bot_token.clone()))
    } else {
        Arc::new(NoopNotifier)
    };
    info!(
        event_name = "system.bootstrap.notifier_mode",
        correlation_id = "bootstrap",
        notifier_mode = if config.slack.is_configured() { "web_api" } else { "noop" },
        "notifier initialized"
    );

    let engine = SubscriptionEngine::new(HierarchyResolver::new(catalog), subscriptions);
    let service = EngineCommandService::new(engine, notifier);
    let router = slash::router(service).merge(health::router(db_pool.clone()));

    Ok(Application { config, db_pool, router })
}
