//! Weather Server - web form for the weather predictors
//!
//! Loads the summary, precipitation-type and temperature models once at
//! startup and serves predictions until interrupted.

use anyhow::Result;
use predictor_lib::{
    health::HealthRegistry,
    observability::{ServiceMetrics, StructuredLogger},
    predictor::{PredictorKind, PredictorRegistry, SlotStatus},
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use weather_server::{api, config};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting weather-server");

    let config = config::ServerConfig::load()?;
    info!(node_name = %config.node_name, model_dir = %config.model_dir.display(), "Server configured");

    let logger = StructuredLogger::new(&config.node_name);
    logger.log_startup(SERVICE_VERSION, &config.model_dir.display().to_string());

    // Load every predictor once; failures disable only that variant
    let predictors = PredictorRegistry::load(&config.model_dir);
    let metrics = ServiceMetrics::new();
    for kind in PredictorKind::ALL {
        match predictors.status(kind) {
            SlotStatus::Loaded { model_version } => {
                metrics.set_model_version(kind, &model_version);
                logger.log_model_loaded(kind, &model_version);
            }
            SlotStatus::Failed { reason } => logger.log_model_load_failed(kind, &reason),
            SlotStatus::Missing => logger.log_model_load_failed(kind, "not registered"),
        }
    }
    metrics.set_models_loaded(predictors.loaded_count() as i64);

    let health_registry = HealthRegistry::new();
    health_registry.sync_predictors(&predictors).await;
    health_registry.set_ready(true).await;

    let app_state = Arc::new(api::AppState::new(
        predictors,
        health_registry,
        metrics,
        logger.clone(),
    ));

    let shutdown_logger = logger.clone();
    api::serve(&config.bind_addr(), app_state, async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown_logger.log_shutdown("SIGINT received");
        }
    })
    .await?;

    info!("Shutting down");
    Ok(())
}
