//! Model artifacts and the handle that owns a loaded model
//!
//! An artifact is a JSON manifest next to an ONNX graph. The manifest fixes
//! the column order of the single-row feature table, how categorical
//! features are one-hot encoded, and (for classifiers) the label decoder.

use super::features::EncodedFeatureRecord;
use super::inference::{Model, OnnxModel};
use crate::error::{PredictError, Result};
use crate::models::fields;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// One column of the model's input row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Column {
    /// Copy a numeric feature as-is
    Numeric { feature: String },
    /// 1.0 when the categorical feature equals `category`, else 0.0
    OneHot { feature: String, category: String },
}

impl Column {
    pub fn numeric(feature: impl Into<String>) -> Self {
        Column::Numeric {
            feature: feature.into(),
        }
    }

    pub fn one_hot(feature: impl Into<String>, category: impl Into<String>) -> Self {
        Column::OneHot {
            feature: feature.into(),
            category: category.into(),
        }
    }

    pub fn feature(&self) -> &str {
        match self {
            Column::Numeric { feature } | Column::OneHot { feature, .. } => feature,
        }
    }

    fn value(&self, encoded: &EncodedFeatureRecord) -> Result<f32> {
        match self {
            Column::Numeric { feature } => Ok(encoded.number(feature)? as f32),
            Column::OneHot { feature, category } => {
                let actual = encoded.category(feature)?;
                Ok(if actual == category { 1.0 } else { 0.0 })
            }
        }
    }
}

/// Fixed column order of a model's input row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureLayout {
    columns: Vec<Column>,
}

impl FeatureLayout {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// The nine shared readings followed by the four cyclical features
    pub fn base() -> Self {
        let numeric = [
            fields::TEMPERATURE,
            fields::APPARENT_TEMPERATURE,
            fields::HUMIDITY,
            fields::WIND_SPEED,
            fields::WIND_BEARING,
            fields::VISIBILITY,
            fields::PRESSURE,
            fields::HOUR,
            fields::MONTH,
        ];
        let columns = numeric
            .iter()
            .chain(fields::CYCLICAL.iter())
            .map(|name| Column::numeric(*name))
            .collect();
        Self { columns }
    }

    /// Append one-hot columns for a categorical feature
    pub fn with_one_hot<I, S>(mut self, feature: &str, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns
            .extend(categories.into_iter().map(|c| Column::one_hot(feature, c)));
        self
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Assemble the single input row. Unknown categories encode to all zeros.
    pub fn assemble(&self, encoded: &EncodedFeatureRecord) -> Result<Vec<f32>> {
        self.columns.iter().map(|c| c.value(encoded)).collect()
    }
}

/// Maps a classifier's integer class index to its label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelDecoder {
    labels: Vec<String>,
}

impl LabelDecoder {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn decode(&self, raw: f64) -> Result<String> {
        if !raw.is_finite() || raw < 0.0 || raw.fract() != 0.0 {
            return Err(PredictError::Decode(raw));
        }
        self.labels
            .get(raw as usize)
            .cloned()
            .ok_or(PredictError::Decode(raw))
    }
}

fn default_version() -> String {
    "unversioned".to_string()
}

/// JSON side of a model artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelManifest {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    /// ONNX file, relative to the manifest
    pub onnx: String,
    /// Optional hex SHA-256 of the ONNX file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

impl ModelManifest {
    pub fn from_path(path: &Path) -> Result<Self> {
        let artifact = path.display().to_string();
        let content = fs::read_to_string(path)
            .map_err(|e| PredictError::load(&artifact, format!("cannot read manifest: {}", e)))?;
        let manifest: ModelManifest = serde_json::from_str(&content)
            .map_err(|e| PredictError::load(&artifact, format!("malformed manifest: {}", e)))?;

        if manifest.columns.is_empty() {
            return Err(PredictError::load(artifact, "manifest declares no columns"));
        }
        Ok(manifest)
    }
}

/// Compute the hex SHA-256 digest of some bytes
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// A loaded model with its column layout and optional label decoder
///
/// Immutable after construction and safe to share across threads.
pub struct ModelHandle {
    name: String,
    version: String,
    layout: FeatureLayout,
    model: Box<dyn Model>,
    decoder: Option<LabelDecoder>,
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("columns", &self.layout.width())
            .field("labels", &self.decoder.as_ref().map(LabelDecoder::len))
            .finish()
    }
}

impl ModelHandle {
    /// Load an artifact from its manifest path
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let artifact = path.display().to_string();
        let manifest = ModelManifest::from_path(path)?;

        let onnx_path = path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&manifest.onnx);
        let bytes = fs::read(&onnx_path).map_err(|e| {
            PredictError::load(&artifact, format!("cannot read {}: {}", onnx_path.display(), e))
        })?;

        if let Some(expected) = &manifest.sha256 {
            let computed = compute_checksum(&bytes);
            if !computed.eq_ignore_ascii_case(expected) {
                return Err(PredictError::load(
                    &artifact,
                    format!("checksum mismatch: expected {}, got {}", expected, computed),
                ));
            }
            debug!(artifact = %artifact, checksum = %computed, "Model checksum validated");
        }

        let layout = FeatureLayout::new(manifest.columns);
        let model = OnnxModel::from_bytes(&bytes, layout.width())
            .map_err(|e| PredictError::load(&artifact, format!("{:#}", e)))?;
        let decoder = if manifest.labels.is_empty() {
            None
        } else {
            Some(LabelDecoder::new(manifest.labels))
        };

        info!(
            artifact = %artifact,
            name = %manifest.name,
            version = %manifest.version,
            columns = layout.width(),
            "Model artifact loaded"
        );

        Ok(Self {
            name: manifest.name,
            version: manifest.version,
            layout,
            model: Box::new(model),
            decoder,
        })
    }

    /// Assemble a handle from an already-constructed model
    pub fn from_parts(
        name: impl Into<String>,
        layout: FeatureLayout,
        model: Box<dyn Model>,
        decoder: Option<LabelDecoder>,
    ) -> Self {
        Self {
            name: name.into(),
            version: default_version(),
            layout,
            model,
            decoder,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    pub fn decoder(&self) -> Option<&LabelDecoder> {
        self.decoder.as_ref()
    }

    /// Run the model on the row assembled from an encoded record
    pub fn predict_raw(&self, encoded: &EncodedFeatureRecord) -> Result<f64> {
        let row = self.layout.assemble(encoded)?;
        if let Some(width) = self.model.input_width() {
            if width != row.len() {
                return Err(PredictError::Inference(format!(
                    "assembled {} columns, model expects {}",
                    row.len(),
                    width
                )));
            }
        }
        self.model.predict_row(&row)
    }

    /// Map a raw class index to its label
    pub fn decode(&self, raw: f64) -> Result<String> {
        match &self.decoder {
            Some(decoder) => decoder.decode(raw),
            None => Err(PredictError::Decode(raw)),
        }
    }
}
