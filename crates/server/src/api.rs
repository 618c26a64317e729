//! HTTP API: prediction form, health checks and Prometheus metrics

use crate::pages;
use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
    Json, Router,
};
use predictor_lib::{
    health::{ComponentStatus, HealthRegistry},
    observability::{ServiceMetrics, StructuredLogger},
    predictor::{PredictorKind, PredictorRegistry},
    PredictError,
};
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Message shown when a form value has the wrong type
pub const INVALID_INPUT_MESSAGE: &str =
    "Invalid input. Please ensure all fields have the correct data type.";

/// Shared application state
pub struct AppState {
    pub predictors: PredictorRegistry,
    pub health_registry: HealthRegistry,
    pub metrics: ServiceMetrics,
    pub logger: StructuredLogger,
}

impl AppState {
    pub fn new(
        predictors: PredictorRegistry,
        health_registry: HealthRegistry,
        metrics: ServiceMetrics,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            predictors,
            health_registry,
            metrics,
            logger,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct IndexParams {
    mode: Option<String>,
    result: Option<String>,
    error: Option<String>,
}

/// Main page; `mode` selects the form, `result`/`error` come from redirects
async fn index(Query(params): Query<IndexParams>) -> Html<String> {
    let mode = params
        .mode
        .as_deref()
        .and_then(|m| m.parse::<PredictorKind>().ok())
        .unwrap_or(PredictorKind::Summary);
    Html(pages::render_index(
        mode,
        params.result.as_deref(),
        params.error.as_deref(),
    ))
}

/// Build the redirect target `/?mode=..&<key>=<value>`
pub fn index_location(kind: PredictorKind, key: &str, value: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("mode", kind.mode())
        .append_pair(key, value)
        .finish();
    format!("/?{}", query)
}

/// User-facing text for a failed prediction
///
/// Type errors get a generic message; anything else is shown verbatim.
pub fn error_message(error: &PredictError) -> String {
    if error.is_type_coercion() {
        INVALID_INPUT_MESSAGE.to_string()
    } else {
        error.to_string()
    }
}

fn handle_prediction(state: &AppState, kind: PredictorKind, form: &HashMap<String, String>) -> Redirect {
    let start = Instant::now();
    let outcome = kind
        .contract()
        .coerce_form(form)
        .and_then(|record| state.predictors.predict(kind, &record));
    let elapsed = start.elapsed().as_secs_f64();

    match outcome {
        Ok(result) => {
            state.metrics.observe_prediction_latency(kind, elapsed);
            state.metrics.inc_predictions_served(kind);
            state.logger.log_prediction(&result, elapsed);
            Redirect::to(&index_location(kind, "result", &result.display_value()))
        }
        Err(e) => {
            state.metrics.inc_prediction_errors(kind, &e);
            state.logger.log_prediction_error(kind, &e);
            Redirect::to(&index_location(kind, "error", &error_message(&e)))
        }
    }
}

async fn predict_summary(
    State(state): State<Arc<AppState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Redirect {
    handle_prediction(&state, PredictorKind::Summary, &form)
}

async fn predict_precip(
    State(state): State<Arc<AppState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Redirect {
    handle_prediction(&state, PredictorKind::PrecipType, &form)
}

async fn predict_temp(
    State(state): State<Arc<AppState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Redirect {
    handle_prediction(&state, PredictorKind::Temperature, &form)
}

/// Health check response - returns 200 if every predictor is loaded, 503 otherwise
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            Vec::new(),
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict/summary", post(predict_summary))
        .route("/predict/precip", post(predict_precip))
        .route("/predict/temp", post(predict_temp))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server, stopping when `shutdown` resolves
pub async fn serve<F>(addr: &str, state: Arc<AppState>, shutdown: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);

    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
