//! Registry holding one predictor per variant
//!
//! Adapters load every artifact once at startup. A variant whose artifact
//! failed to load stays registered as a failure so that requests for it
//! surface the original load error instead of panicking or retrying.

use super::contract::PredictorKind;
use super::facade::{PrecipTypePredictor, TemperaturePredictor, WeatherSummaryPredictor};
use super::output::PredictionResult;
use super::WeatherPredictor;
use crate::error::{PredictError, Result};
use crate::models::FeatureRecord;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

/// Load the façade for one variant from a model directory
pub fn load_predictor(kind: PredictorKind, model_dir: &Path) -> Result<Box<dyn WeatherPredictor>> {
    Ok(match kind {
        PredictorKind::Summary => Box::new(WeatherSummaryPredictor::load_from_dir(model_dir)?),
        PredictorKind::PrecipType => Box::new(PrecipTypePredictor::load_from_dir(model_dir)?),
        PredictorKind::Temperature => Box::new(TemperaturePredictor::load_from_dir(model_dir)?),
    })
}

enum Slot {
    Ready(Box<dyn WeatherPredictor>),
    Failed { artifact: String, reason: String },
}

/// Load status of one variant, for health reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotStatus {
    Loaded { model_version: String },
    Failed { reason: String },
    Missing,
}

#[derive(Default)]
pub struct PredictorRegistry {
    slots: BTreeMap<PredictorKind, Slot>,
}

impl PredictorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load all three artifacts from a model directory
    pub fn load(model_dir: &Path) -> Self {
        let mut registry = Self::new();
        for kind in PredictorKind::ALL {
            match load_predictor(kind, model_dir) {
                Ok(predictor) => {
                    info!(predictor = %kind, version = %predictor.model_version(), "Predictor ready");
                    registry.slots.insert(kind, Slot::Ready(predictor));
                }
                Err(e) => {
                    warn!(predictor = %kind, error = %e, "Predictor unavailable");
                    registry.insert_failure(kind, e);
                }
            }
        }
        registry
    }

    /// Register a constructed predictor, replacing any previous entry
    pub fn insert<P: WeatherPredictor + 'static>(&mut self, predictor: P) {
        self.slots.insert(predictor.kind(), Slot::Ready(Box::new(predictor)));
    }

    pub fn with<P: WeatherPredictor + 'static>(mut self, predictor: P) -> Self {
        self.insert(predictor);
        self
    }

    /// Record that a variant could not be constructed
    pub fn insert_failure(&mut self, kind: PredictorKind, error: PredictError) {
        let slot = match error {
            PredictError::Load { artifact, reason } => Slot::Failed { artifact, reason },
            other => Slot::Failed {
                artifact: kind.artifact_name().to_string(),
                reason: other.to_string(),
            },
        };
        self.slots.insert(kind, slot);
    }

    pub fn get(&self, kind: PredictorKind) -> Result<&dyn WeatherPredictor> {
        match self.slots.get(&kind) {
            Some(Slot::Ready(p)) => Ok(p.as_ref()),
            Some(Slot::Failed { artifact, reason }) => Err(PredictError::load(artifact, reason)),
            None => Err(PredictError::load(kind.artifact_name(), "predictor not registered")),
        }
    }

    /// Run the predictor for `kind` on a record
    pub fn predict(&self, kind: PredictorKind, record: &FeatureRecord) -> Result<PredictionResult> {
        self.get(kind)?.predict_record(record)
    }

    pub fn status(&self, kind: PredictorKind) -> SlotStatus {
        match self.slots.get(&kind) {
            Some(Slot::Ready(p)) => SlotStatus::Loaded {
                model_version: p.model_version().to_string(),
            },
            Some(Slot::Failed { reason, .. }) => SlotStatus::Failed {
                reason: reason.clone(),
            },
            None => SlotStatus::Missing,
        }
    }

    pub fn loaded_count(&self) -> usize {
        self.slots
            .values()
            .filter(|s| matches!(s, Slot::Ready(_)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fields;
    use crate::predictor::artifact::{FeatureLayout, LabelDecoder, ModelHandle};
    use crate::predictor::inference::ConstantModel;

    fn precip() -> PrecipTypePredictor {
        let handle = ModelHandle::from_parts(
            "preciptype_forecast_model",
            FeatureLayout::base(),
            Box::new(ConstantModel(0.0)),
            Some(LabelDecoder::new(["rain", "snow"])),
        )
        .with_version("3.1.0");
        PrecipTypePredictor::from_handle(handle).unwrap()
    }

    fn record() -> FeatureRecord {
        FeatureRecord::new()
            .with(fields::TEMPERATURE, 1.0)
            .with(fields::APPARENT_TEMPERATURE, -1.0)
            .with(fields::HUMIDITY, 0.9)
            .with(fields::WIND_SPEED, 5.0)
            .with(fields::WIND_BEARING, 90.0)
            .with(fields::VISIBILITY, 3.0)
            .with(fields::PRESSURE, 1002.0)
            .with(fields::HOUR, 4i64)
            .with(fields::MONTH, 1i64)
    }

    #[test]
    fn test_registered_predictor_serves() {
        let registry = PredictorRegistry::new().with(precip());
        let result = registry.predict(PredictorKind::PrecipType, &record()).unwrap();
        assert_eq!(result.display_value(), "rain");
        assert_eq!(registry.loaded_count(), 1);
        assert_eq!(
            registry.status(PredictorKind::PrecipType),
            SlotStatus::Loaded {
                model_version: "3.1.0".to_string()
            }
        );
    }

    #[test]
    fn test_unregistered_predictor_is_load_error() {
        let registry = PredictorRegistry::new();
        let err = registry.predict(PredictorKind::Summary, &record()).unwrap_err();
        assert!(matches!(err, PredictError::Load { .. }));
        assert_eq!(registry.status(PredictorKind::Summary), SlotStatus::Missing);
    }

    #[test]
    fn test_failure_is_replayed() {
        let mut registry = PredictorRegistry::new();
        registry.insert_failure(
            PredictorKind::Temperature,
            PredictError::load("temperature_forecast_model.json", "cannot read manifest"),
        );
        let err = registry.predict(PredictorKind::Temperature, &record()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to load model artifact 'temperature_forecast_model.json': cannot read manifest"
        );
        assert!(matches!(
            registry.status(PredictorKind::Temperature),
            SlotStatus::Failed { .. }
        ));
    }

    #[test]
    fn test_load_from_empty_dir_records_failures() {
        let dir = tempfile::TempDir::new().unwrap();
        let registry = PredictorRegistry::load(dir.path());
        assert_eq!(registry.loaded_count(), 0);
        for kind in PredictorKind::ALL {
            assert!(matches!(registry.status(kind), SlotStatus::Failed { .. }));
        }
    }
}
