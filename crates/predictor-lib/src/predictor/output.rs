//! Prediction results and their text rendering

use super::contract::PredictorKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value produced by one predictor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictionValue {
    /// Summary or precipitation label
    Label(String),
    /// Next-hour temperature in °C
    Celsius(f64),
}

impl PredictionValue {
    pub fn as_label(&self) -> Option<&str> {
        match self {
            PredictionValue::Label(s) => Some(s),
            PredictionValue::Celsius(_) => None,
        }
    }

    pub fn as_celsius(&self) -> Option<f64> {
        match self {
            PredictionValue::Celsius(v) => Some(*v),
            PredictionValue::Label(_) => None,
        }
    }
}

impl fmt::Display for PredictionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictionValue::Label(label) => f.write_str(label),
            PredictionValue::Celsius(v) => f.write_str(&format_celsius(*v)),
        }
    }
}

/// A prediction paired with the variant and model that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub kind: PredictorKind,
    pub value: PredictionValue,
    pub model_version: String,
    pub generated_at: i64,
}

impl PredictionResult {
    pub fn new(kind: PredictorKind, value: PredictionValue, model_version: impl Into<String>) -> Self {
        Self {
            kind,
            value,
            model_version: model_version.into(),
            generated_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Text shown to users, e.g. "Overcast" or "12.35 C"
    pub fn display_value(&self) -> String {
        self.value.to_string()
    }

    /// Console line, e.g. "Predicted Temperature: 12.35 C"
    pub fn headline(&self) -> String {
        format!("Predicted {}: {}", self.kind.display_name(), self.value)
    }
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.headline())
    }
}

/// Two-decimal Celsius rendering used by both adapters
pub fn format_celsius(value: f64) -> String {
    format!("{:.2} C", value)
}
