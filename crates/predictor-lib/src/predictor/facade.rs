//! The three predictor façades
//!
//! Each façade pairs a [`ModelHandle`] with the shared encoder and its
//! variant's input contract. A `predict` call validates, encodes, runs the
//! model and decodes, and either fully succeeds or fails without partial
//! output.

use super::artifact::{Column, ModelHandle};
use super::contract::{InputContract, PredictorKind};
use super::features::FeatureEncoder;
use super::output::{PredictionResult, PredictionValue};
use super::WeatherPredictor;
use crate::error::{PredictError, Result};
use crate::models::{FeatureRecord, FieldKind, PrecipTypeInput, SummaryInput, TemperatureInput};
use std::path::Path;

/// Validation, encoding and model dispatch shared by all variants
#[derive(Debug)]
struct Pipeline {
    contract: InputContract,
    encoder: FeatureEncoder,
    handle: ModelHandle,
}

impl Pipeline {
    /// Reject handles that cannot serve this variant
    fn new(kind: PredictorKind, handle: ModelHandle) -> Result<Self> {
        let contract = kind.contract();

        if kind.requires_labels() && handle.decoder().map_or(true, |d| d.is_empty()) {
            return Err(PredictError::load(handle.name(), "artifact has no label decoder"));
        }

        for column in handle.layout().columns() {
            if !contract.accepts_feature(column.feature()) {
                return Err(PredictError::load(
                    handle.name(),
                    format!(
                        "column '{}' is not an input of the {} predictor",
                        column.feature(),
                        kind
                    ),
                ));
            }
            if !column_fits(&contract, column) {
                return Err(PredictError::load(
                    handle.name(),
                    format!(
                        "column '{}' cannot encode a field of that kind",
                        column.feature()
                    ),
                ));
            }
        }

        Ok(Self {
            contract,
            encoder: FeatureEncoder::new(),
            handle,
        })
    }

    fn kind(&self) -> PredictorKind {
        self.contract.kind()
    }

    fn run(&self, record: &FeatureRecord) -> Result<f64> {
        self.contract.validate(record)?;
        let encoded = self.encoder.encode(record)?;
        self.handle.predict_raw(&encoded)
    }

    fn run_labelled(&self, record: &FeatureRecord) -> Result<String> {
        let raw = self.run(record)?;
        self.handle.decode(raw)
    }
}

/// Numeric columns need a numeric field, one-hot columns a text field
fn column_fits(contract: &InputContract, column: &Column) -> bool {
    let field_kind = match contract.field(column.feature()) {
        Some(spec) => spec.kind,
        // cyclical features are derived floats
        None => FieldKind::Float,
    };
    match column {
        Column::Numeric { .. } => field_kind.is_numeric(),
        Column::OneHot { .. } => field_kind == FieldKind::Text,
    }
}

fn artifact_path(model_dir: &Path, kind: PredictorKind) -> std::path::PathBuf {
    model_dir.join(format!("{}.json", kind.artifact_name()))
}

/// Predicts the weather summary for the next hour
#[derive(Debug)]
pub struct WeatherSummaryPredictor {
    pipeline: Pipeline,
}

impl WeatherSummaryPredictor {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_handle(ModelHandle::load(path)?)
    }

    /// Load `summary_forecast_model.json` from a model directory
    pub fn load_from_dir(model_dir: impl AsRef<Path>) -> Result<Self> {
        Self::load(artifact_path(model_dir.as_ref(), PredictorKind::Summary))
    }

    pub fn from_handle(handle: ModelHandle) -> Result<Self> {
        Ok(Self {
            pipeline: Pipeline::new(PredictorKind::Summary, handle)?,
        })
    }

    pub fn predict(&self, record: &FeatureRecord) -> Result<String> {
        self.pipeline.run_labelled(record)
    }

    pub fn predict_input(&self, input: &SummaryInput) -> Result<String> {
        self.predict(&FeatureRecord::from(input))
    }
}

/// Predicts the precipitation type
#[derive(Debug)]
pub struct PrecipTypePredictor {
    pipeline: Pipeline,
}

impl PrecipTypePredictor {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_handle(ModelHandle::load(path)?)
    }

    /// Load `preciptype_forecast_model.json` from a model directory
    pub fn load_from_dir(model_dir: impl AsRef<Path>) -> Result<Self> {
        Self::load(artifact_path(model_dir.as_ref(), PredictorKind::PrecipType))
    }

    pub fn from_handle(handle: ModelHandle) -> Result<Self> {
        Ok(Self {
            pipeline: Pipeline::new(PredictorKind::PrecipType, handle)?,
        })
    }

    pub fn predict(&self, record: &FeatureRecord) -> Result<String> {
        self.pipeline.run_labelled(record)
    }

    pub fn predict_input(&self, input: &PrecipTypeInput) -> Result<String> {
        self.predict(&FeatureRecord::from(input))
    }
}

/// Predicts the temperature for the next hour, in °C
#[derive(Debug)]
pub struct TemperaturePredictor {
    pipeline: Pipeline,
}

impl TemperaturePredictor {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_handle(ModelHandle::load(path)?)
    }

    /// Load `temperature_forecast_model.json` from a model directory
    pub fn load_from_dir(model_dir: impl AsRef<Path>) -> Result<Self> {
        Self::load(artifact_path(model_dir.as_ref(), PredictorKind::Temperature))
    }

    pub fn from_handle(handle: ModelHandle) -> Result<Self> {
        Ok(Self {
            pipeline: Pipeline::new(PredictorKind::Temperature, handle)?,
        })
    }

    /// Unformatted model output
    pub fn predict(&self, record: &FeatureRecord) -> Result<f64> {
        self.pipeline.run(record)
    }

    pub fn predict_input(&self, input: &TemperatureInput) -> Result<f64> {
        self.predict(&FeatureRecord::from(input))
    }
}

impl WeatherPredictor for WeatherSummaryPredictor {
    fn kind(&self) -> PredictorKind {
        self.pipeline.kind()
    }

    fn model_version(&self) -> &str {
        self.pipeline.handle.version()
    }

    fn predict_record(&self, record: &FeatureRecord) -> Result<PredictionResult> {
        let label = self.predict(record)?;
        Ok(PredictionResult::new(self.kind(), PredictionValue::Label(label), self.model_version()))
    }
}

impl WeatherPredictor for PrecipTypePredictor {
    fn kind(&self) -> PredictorKind {
        self.pipeline.kind()
    }

    fn model_version(&self) -> &str {
        self.pipeline.handle.version()
    }

    fn predict_record(&self, record: &FeatureRecord) -> Result<PredictionResult> {
        let label = self.predict(record)?;
        Ok(PredictionResult::new(self.kind(), PredictionValue::Label(label), self.model_version()))
    }
}

impl WeatherPredictor for TemperaturePredictor {
    fn kind(&self) -> PredictorKind {
        self.pipeline.kind()
    }

    fn model_version(&self) -> &str {
        self.pipeline.handle.version()
    }

    fn predict_record(&self, record: &FeatureRecord) -> Result<PredictionResult> {
        let value = self.predict(record)?;
        Ok(PredictionResult::new(self.kind(), PredictionValue::Celsius(value), self.model_version()))
    }
}
