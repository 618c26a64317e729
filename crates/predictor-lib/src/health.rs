//! Health check infrastructure for the prediction service
//!
//! Tracks one component per predictor variant and reports liveness and
//! readiness for the service's health endpoints.

use crate::predictor::{PredictorKind, PredictorRegistry, SlotStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Health status of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    /// Predictor is loaded and serving
    Healthy,
    /// Predictor failed to load or is not registered
    Unhealthy,
}

impl ComponentStatus {
    pub fn is_operational(&self) -> bool {
        matches!(self, ComponentStatus::Healthy)
    }
}

/// Information about a component's health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub last_check_timestamp: i64,
}

impl ComponentHealth {
    pub fn healthy() -> Self {
        Self {
            status: ComponentStatus::Healthy,
            message: None,
            last_check_timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: ComponentStatus::Unhealthy,
            message: Some(message.into()),
            last_check_timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// Overall health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub components: HashMap<String, ComponentHealth>,
}

impl HealthResponse {
    /// Compute overall status from component statuses
    pub fn compute_status(components: &HashMap<String, ComponentHealth>) -> ComponentStatus {
        if components.values().all(|c| c.status.is_operational()) {
            ComponentStatus::Healthy
        } else {
            ComponentStatus::Unhealthy
        }
    }
}

/// Readiness response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Component names for health tracking
pub mod components {
    use super::PredictorKind;

    pub const SUMMARY_MODEL: &str = "summary_model";
    pub const PRECIP_MODEL: &str = "precip_model";
    pub const TEMPERATURE_MODEL: &str = "temperature_model";

    /// Component tracking the given predictor variant
    pub fn for_predictor(kind: PredictorKind) -> &'static str {
        match kind {
            PredictorKind::Summary => SUMMARY_MODEL,
            PredictorKind::PrecipType => PRECIP_MODEL,
            PredictorKind::Temperature => TEMPERATURE_MODEL,
        }
    }
}

/// Health registry for tracking component health
#[derive(Debug, Clone)]
pub struct HealthRegistry {
    components: Arc<RwLock<HashMap<String, ComponentHealth>>>,
    ready: Arc<RwLock<bool>>,
}

impl Default for HealthRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self {
            components: Arc::new(RwLock::new(HashMap::new())),
            ready: Arc::new(RwLock::new(false)),
        }
    }

    /// Update component health status
    pub async fn update(&self, name: &str, health: ComponentHealth) {
        let mut components = self.components.write().await;
        components.insert(name.to_string(), health);
    }

    /// Mark component as healthy
    pub async fn set_healthy(&self, name: &str) {
        self.update(name, ComponentHealth::healthy()).await;
    }

    /// Mark component as unhealthy
    pub async fn set_unhealthy(&self, name: &str, message: impl Into<String>) {
        self.update(name, ComponentHealth::unhealthy(message)).await;
    }

    /// Set readiness status
    pub async fn set_ready(&self, ready: bool) {
        let mut r = self.ready.write().await;
        *r = ready;
    }

    /// Mirror the load status of every predictor variant
    pub async fn sync_predictors(&self, predictors: &PredictorRegistry) {
        for kind in PredictorKind::ALL {
            let name = components::for_predictor(kind);
            match predictors.status(kind) {
                SlotStatus::Loaded { .. } => self.set_healthy(name).await,
                SlotStatus::Failed { reason } => self.set_unhealthy(name, reason).await,
                SlotStatus::Missing => self.set_unhealthy(name, "predictor not registered").await,
            }
        }
    }

    /// Get health response
    pub async fn health(&self) -> HealthResponse {
        let components = self.components.read().await.clone();
        let status = HealthResponse::compute_status(&components);
        HealthResponse { status, components }
    }

    /// Get readiness response
    ///
    /// The service is ready once initialized and while at least one
    /// predictor can serve requests.
    pub async fn readiness(&self) -> ReadinessResponse {
        let ready = *self.ready.read().await;
        let health = self.health().await;

        let any_operational = health
            .components
            .values()
            .any(|c| c.status.is_operational());

        if !ready {
            ReadinessResponse {
                ready: false,
                reason: Some("Service not yet initialized".to_string()),
            }
        } else if !any_operational {
            ReadinessResponse {
                ready: false,
                reason: Some("No predictor is available".to_string()),
            }
        } else {
            ReadinessResponse {
                ready: true,
                reason: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_registry_initial_state() {
        let registry = HealthRegistry::new();
        let health = registry.health().await;

        assert_eq!(health.status, ComponentStatus::Healthy);
        assert!(health.components.is_empty());
    }

    #[tokio::test]
    async fn test_health_registry_marks_component_healthy() {
        let registry = HealthRegistry::new();
        registry.set_healthy(components::SUMMARY_MODEL).await;

        let health = registry.health().await;
        assert!(health.components.contains_key(components::SUMMARY_MODEL));
        assert_eq!(
            health.components[components::SUMMARY_MODEL].status,
            ComponentStatus::Healthy
        );
    }

    #[tokio::test]
    async fn test_health_registry_unhealthy_status() {
        let registry = HealthRegistry::new();
        registry.set_healthy(components::SUMMARY_MODEL).await;
        registry.set_healthy(components::PRECIP_MODEL).await;

        registry
            .set_unhealthy(components::PRECIP_MODEL, "artifact missing")
            .await;

        let health = registry.health().await;
        assert_eq!(health.status, ComponentStatus::Unhealthy);
        assert_eq!(
            health.components[components::PRECIP_MODEL].message.as_deref(),
            Some("artifact missing")
        );
    }

    #[tokio::test]
    async fn test_readiness_not_ready_initially() {
        let registry = HealthRegistry::new();
        let readiness = registry.readiness().await;

        assert!(!readiness.ready);
        assert!(readiness.reason.is_some());
    }

    #[tokio::test]
    async fn test_readiness_requires_a_predictor() {
        let registry = HealthRegistry::new();
        registry.set_ready(true).await;

        let readiness = registry.readiness().await;
        assert!(!readiness.ready);
        assert_eq!(readiness.reason.as_deref(), Some("No predictor is available"));
    }

    #[tokio::test]
    async fn test_readiness_survives_partial_failure() {
        let registry = HealthRegistry::new();
        registry.set_healthy(components::SUMMARY_MODEL).await;
        registry.set_healthy(components::TEMPERATURE_MODEL).await;
        registry.set_ready(true).await;
        registry
            .set_unhealthy(components::TEMPERATURE_MODEL, "checksum mismatch")
            .await;

        let readiness = registry.readiness().await;
        assert!(readiness.ready);
    }

    #[tokio::test]
    async fn test_sync_predictors_marks_missing_unhealthy() {
        let registry = HealthRegistry::new();
        registry.sync_predictors(&PredictorRegistry::new()).await;

        let health = registry.health().await;
        assert_eq!(health.components.len(), 3);
        assert_eq!(health.status, ComponentStatus::Unhealthy);
    }

    #[tokio::test]
    async fn test_sync_predictors_mirrors_slot_status() {
        use crate::predictor::{ConstantModel, FeatureLayout, LabelDecoder, ModelHandle, PrecipTypePredictor};

        let handle = ModelHandle::from_parts(
            "preciptype_forecast_model",
            FeatureLayout::base(),
            Box::new(ConstantModel(0.0)),
            Some(LabelDecoder::new(["rain", "snow"])),
        );
        let mut predictors = PredictorRegistry::new().with(PrecipTypePredictor::from_handle(handle).unwrap());
        predictors.insert_failure(
            PredictorKind::Summary,
            crate::PredictError::load("summary_forecast_model.json", "checksum mismatch"),
        );

        let registry = HealthRegistry::new();
        registry.sync_predictors(&predictors).await;
        registry.set_ready(true).await;

        let health = registry.health().await;
        assert_eq!(health.status, ComponentStatus::Unhealthy);
        assert_eq!(health.components[components::PRECIP_MODEL].status, ComponentStatus::Healthy);
        assert_eq!(
            health.components[components::SUMMARY_MODEL].message.as_deref(),
            Some("checksum mismatch")
        );
        assert_eq!(
            serde_json::to_value(&health).unwrap()["components"][components::TEMPERATURE_MODEL]["status"],
            "unhealthy"
        );
        assert!(registry.readiness().await.ready);
    }

    #[tokio::test]
    async fn test_readiness_not_ready_when_all_unhealthy() {
        let registry = HealthRegistry::new();
        registry.set_ready(true).await;
        for kind in PredictorKind::ALL {
            registry
                .set_unhealthy(components::for_predictor(kind), "missing")
                .await;
        }

        let readiness = registry.readiness().await;
        assert!(!readiness.ready);
    }
}
