//! Observability infrastructure for the prediction service
//!
//! Provides:
//! - Prometheus metrics (prediction counts, errors, latency, loaded models)
//! - Structured JSON logging with tracing

use crate::error::PredictError;
use crate::predictor::{PredictionResult, PredictorKind};
use prometheus::{
    register_gauge_vec, register_histogram_vec, register_int_counter_vec, register_int_gauge,
    GaugeVec, HistogramVec, IntCounterVec, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ServiceMetricsInner> = OnceLock::new();

/// Inner metrics structure that holds the actual Prometheus metrics
struct ServiceMetricsInner {
    prediction_latency_seconds: HistogramVec,
    predictions_served: IntCounterVec,
    prediction_errors: IntCounterVec,
    models_loaded: IntGauge,
    model_version_info: GaugeVec,
}

impl ServiceMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram_vec!(
                "weather_predictor_prediction_latency_seconds",
                "Time spent coercing input and running a prediction",
                &["predictor"],
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_served: register_int_counter_vec!(
                "weather_predictor_predictions_total",
                "Total number of successful predictions",
                &["predictor"]
            )
            .expect("Failed to register predictions_total"),

            prediction_errors: register_int_counter_vec!(
                "weather_predictor_prediction_errors_total",
                "Total number of failed predictions by error kind",
                &["predictor", "error"]
            )
            .expect("Failed to register prediction_errors_total"),

            models_loaded: register_int_gauge!(
                "weather_predictor_models_loaded",
                "Number of predictor models currently loaded"
            )
            .expect("Failed to register models_loaded"),

            model_version_info: register_gauge_vec!(
                "weather_predictor_model_version_info",
                "Version of the model loaded for each predictor",
                &["predictor", "version"]
            )
            .expect("Failed to register model_version_info"),
        }
    }
}

/// Service metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct ServiceMetrics {
    _private: (),
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ServiceMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ServiceMetricsInner {
        GLOBAL_METRICS.get_or_init(ServiceMetricsInner::new)
    }

    pub fn observe_prediction_latency(&self, kind: PredictorKind, duration_secs: f64) {
        self.inner()
            .prediction_latency_seconds
            .with_label_values(&[kind.mode()])
            .observe(duration_secs);
    }

    pub fn inc_predictions_served(&self, kind: PredictorKind) {
        self.inner()
            .predictions_served
            .with_label_values(&[kind.mode()])
            .inc();
    }

    pub fn inc_prediction_errors(&self, kind: PredictorKind, error: &PredictError) {
        self.inner()
            .prediction_errors
            .with_label_values(&[kind.mode(), error.kind_label()])
            .inc();
    }

    pub fn set_models_loaded(&self, count: i64) {
        self.inner().models_loaded.set(count);
    }

    /// Update model version info for one predictor
    pub fn set_model_version(&self, kind: PredictorKind, version: &str) {
        self.inner()
            .model_version_info
            .with_label_values(&[kind.mode(), version])
            .set(1.0);
    }

    pub fn predictions_served(&self, kind: PredictorKind) -> u64 {
        self.inner()
            .predictions_served
            .with_label_values(&[kind.mode()])
            .get()
    }
}

/// Structured logger for service events
///
/// Provides consistent JSON-formatted logging for model loading,
/// predictions and lifecycle events.
#[derive(Clone)]
pub struct StructuredLogger {
    node_name: String,
}

impl StructuredLogger {
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
        }
    }

    /// Log service startup
    pub fn log_startup(&self, version: &str, model_dir: &str) {
        info!(
            event = "service_started",
            node = %self.node_name,
            service_version = %version,
            model_dir = %model_dir,
            "Weather prediction service started"
        );
    }

    /// Log service shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            node = %self.node_name,
            reason = %reason,
            "Weather prediction service shutting down"
        );
    }

    pub fn log_model_loaded(&self, kind: PredictorKind, version: &str) {
        info!(
            event = "model_loaded",
            node = %self.node_name,
            predictor = %kind,
            model_version = %version,
            "Predictor model loaded"
        );
    }

    pub fn log_model_load_failed(&self, kind: PredictorKind, reason: &str) {
        warn!(
            event = "model_load_failed",
            node = %self.node_name,
            predictor = %kind,
            reason = %reason,
            "Predictor model failed to load, variant disabled"
        );
    }

    /// Log a served prediction
    pub fn log_prediction(&self, result: &PredictionResult, elapsed_secs: f64) {
        info!(
            event = "prediction_served",
            node = %self.node_name,
            predictor = %result.kind,
            value = %result.value,
            model_version = %result.model_version,
            elapsed_secs = elapsed_secs,
            "Prediction served"
        );
    }

    /// Log a failed prediction; input errors are expected and logged quietly
    pub fn log_prediction_error(&self, kind: PredictorKind, error: &PredictError) {
        if error.is_input_error() {
            info!(
                event = "prediction_failed",
                node = %self.node_name,
                predictor = %kind,
                error_kind = error.kind_label(),
                error = %error,
                "Prediction rejected invalid input"
            );
        } else {
            warn!(
                event = "prediction_failed",
                node = %self.node_name,
                predictor = %kind,
                error_kind = error.kind_label(),
                error = %error,
                "Prediction failed"
            );
        }
    }
}
