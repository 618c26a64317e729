//! Core data models for weather prediction requests

use crate::error::{PredictError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Feature names as they appear in the training data
pub mod fields {
    pub const TEMPERATURE: &str = "Temperature (C)";
    pub const APPARENT_TEMPERATURE: &str = "Apparent Temperature (C)";
    pub const HUMIDITY: &str = "Humidity";
    pub const WIND_SPEED: &str = "Wind Speed (km/h)";
    pub const WIND_BEARING: &str = "Wind Bearing (degrees)";
    pub const VISIBILITY: &str = "Visibility (km)";
    pub const PRESSURE: &str = "Pressure (millibars)";
    pub const HOUR: &str = "Hour";
    pub const MONTH: &str = "Month";
    pub const PRECIP_TYPE: &str = "Precip Type";
    pub const SUMMARY: &str = "Summary";

    pub const HOUR_SIN: &str = "hour_sin";
    pub const HOUR_COS: &str = "hour_cos";
    pub const MONTH_SIN: &str = "month_sin";
    pub const MONTH_COS: &str = "month_cos";

    /// Derived features added by the encoder
    pub const CYCLICAL: [&str; 4] = [HOUR_SIN, HOUR_COS, MONTH_SIN, MONTH_COS];
}

/// Declared type of an input field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Float,
    Integer,
    Text,
}

impl FieldKind {
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldKind::Float | FieldKind::Integer)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Float => write!(f, "a number"),
            FieldKind::Integer => write!(f, "an integer"),
            FieldKind::Text => write!(f, "text"),
        }
    }
}

/// A single feature value: numeric or categorical
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Category(String),
}

impl FeatureValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(v) => Some(*v),
            FeatureValue::Category(_) => None,
        }
    }

    pub fn as_category(&self) -> Option<&str> {
        match self {
            FeatureValue::Category(s) => Some(s),
            FeatureValue::Number(_) => None,
        }
    }
}

impl From<f64> for FeatureValue {
    fn from(v: f64) -> Self {
        FeatureValue::Number(v)
    }
}

impl From<i64> for FeatureValue {
    fn from(v: i64) -> Self {
        FeatureValue::Number(v as f64)
    }
}

impl From<&str> for FeatureValue {
    fn from(v: &str) -> Self {
        FeatureValue::Category(v.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(v: String) -> Self {
        FeatureValue::Category(v)
    }
}

/// Named inputs for one inference call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureRecord {
    values: BTreeMap<String, FeatureValue>,
}

impl FeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FeatureValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FeatureValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<FeatureValue> {
        self.values.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Numeric value of a feature, failing if absent or categorical
    pub fn number(&self, name: &str) -> Result<f64> {
        match self.values.get(name) {
            Some(value) => value.as_number().ok_or_else(|| PredictError::WrongKind {
                field: name.to_string(),
                expected: FieldKind::Float,
            }),
            None => Err(PredictError::MissingField(name.to_string())),
        }
    }

    /// Categorical value of a feature, failing if absent or numeric
    pub fn category(&self, name: &str) -> Result<&str> {
        match self.values.get(name) {
            Some(value) => value.as_category().ok_or_else(|| PredictError::WrongKind {
                field: name.to_string(),
                expected: FieldKind::Text,
            }),
            None => Err(PredictError::MissingField(name.to_string())),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The nine weather readings shared by every predictor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub temperature_c: f64,
    pub apparent_temperature_c: f64,
    pub humidity: f64,
    pub wind_speed_kmh: f64,
    pub wind_bearing_degrees: f64,
    pub visibility_km: f64,
    pub pressure_millibars: f64,
    pub hour: i64,
    pub month: i64,
}

impl WeatherObservation {
    pub fn to_record(&self) -> FeatureRecord {
        FeatureRecord::new()
            .with(fields::TEMPERATURE, self.temperature_c)
            .with(fields::APPARENT_TEMPERATURE, self.apparent_temperature_c)
            .with(fields::HUMIDITY, self.humidity)
            .with(fields::WIND_SPEED, self.wind_speed_kmh)
            .with(fields::WIND_BEARING, self.wind_bearing_degrees)
            .with(fields::VISIBILITY, self.visibility_km)
            .with(fields::PRESSURE, self.pressure_millibars)
            .with(fields::HOUR, self.hour)
            .with(fields::MONTH, self.month)
    }
}

/// Input for the weather-summary classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryInput {
    #[serde(flatten)]
    pub observation: WeatherObservation,
    pub precip_type: String,
}

impl From<&SummaryInput> for FeatureRecord {
    fn from(input: &SummaryInput) -> Self {
        input
            .observation
            .to_record()
            .with(fields::PRECIP_TYPE, input.precip_type.as_str())
    }
}

/// Input for the precipitation-type classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecipTypeInput {
    #[serde(flatten)]
    pub observation: WeatherObservation,
}

impl From<&PrecipTypeInput> for FeatureRecord {
    fn from(input: &PrecipTypeInput) -> Self {
        input.observation.to_record()
    }
}

/// Input for the next-hour temperature regressor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureInput {
    #[serde(flatten)]
    pub observation: WeatherObservation,
    pub summary: String,
    pub precip_type: String,
}

impl From<&TemperatureInput> for FeatureRecord {
    fn from(input: &TemperatureInput) -> Self {
        input
            .observation
            .to_record()
            .with(fields::SUMMARY, input.summary.as_str())
            .with(fields::PRECIP_TYPE, input.precip_type.as_str())
    }
}
