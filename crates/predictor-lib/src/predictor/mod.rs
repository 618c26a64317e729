//! Prediction pipeline: contracts, encoding, model handles and façades

mod artifact;
mod contract;
mod facade;
mod features;
mod inference;
mod output;
mod registry;

pub use artifact::{compute_checksum, Column, FeatureLayout, LabelDecoder, ModelHandle, ModelManifest};
pub use contract::{FieldSpec, InputContract, PredictorKind};
pub use facade::{PrecipTypePredictor, TemperaturePredictor, WeatherSummaryPredictor};
pub use features::{encode, CyclicalFeatures, EncodedFeatureRecord, FeatureEncoder, HOURS_PER_DAY, MONTHS_PER_YEAR};
pub use inference::{ConstantModel, Model, OnnxModel};
pub use output::{format_celsius, PredictionResult, PredictionValue};
pub use registry::{load_predictor, PredictorRegistry, SlotStatus};

use crate::error::Result;
use crate::models::FeatureRecord;

/// Object-safe view over the three façades
pub trait WeatherPredictor: Send + Sync {
    fn kind(&self) -> PredictorKind;

    /// Version string from the loaded artifact
    fn model_version(&self) -> &str;

    /// Validate, encode and predict, tagging the result with its variant
    fn predict_record(&self, record: &FeatureRecord) -> Result<PredictionResult>;
}
