use std::sync::Arc;

use hilight_core::config::{AppConfig, ConfigError, LoadOptions};
use hilight_core::lifecycle::announce_initialized;
use hilight_core::{Catalog, RecommendationEngine};
use hilight_sheets::InteractionLogger;
use thiserror::Error;
use tracing::info;

use crate::api::AppState;
use crate::health::HealthState;

pub struct Application {
    pub config: AppConfig,
    pub engine: Arc<RecommendationEngine>,
    pub logger: InteractionLogger,
}

impl Application {
    pub fn api_state(&self) -> AppState {
        AppState { engine: Arc::clone(&self.engine), logger: self.logger.clone() }
    }

    pub fn health_state(&self) -> HealthState {
        HealthState::new(&self.config, self.engine.catalog().len())
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
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

    let catalog = Arc::new(Catalog::load(&config.catalog.path));
    info!(
        event_name = "system.bootstrap.catalog_loaded",
        correlation_id = "bootstrap",
        products = catalog.len(),
        "product catalog loaded"
    );

    let engine = Arc::new(RecommendationEngine::new(catalog));
    let logger = InteractionLogger::from_config(&config);
    info!(
        event_name = "system.bootstrap.sinks_ready",
        correlation_id = "bootstrap",
        sinks = ?logger.sink_names(),
        "interaction log sinks configured"
    );

    announce_initialized(&config);
    Ok(Application { config, engine, logger })
}
