//! Input contracts for the three predictor variants
//!
//! A contract lists the fields a variant requires, their declared types and
//! the form keys and prompts the adapters use to collect them.

use crate::error::{PredictError, Result};
use crate::models::{fields, FeatureRecord, FeatureValue, FieldKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// The three predictor variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PredictorKind {
    #[serde(rename = "summary")]
    Summary,
    #[serde(rename = "precip")]
    PrecipType,
    #[serde(rename = "temp")]
    Temperature,
}

impl PredictorKind {
    pub const ALL: [PredictorKind; 3] = [
        PredictorKind::Summary,
        PredictorKind::PrecipType,
        PredictorKind::Temperature,
    ];

    /// Short name used in routes and query strings
    pub fn mode(&self) -> &'static str {
        match self {
            PredictorKind::Summary => "summary",
            PredictorKind::PrecipType => "precip",
            PredictorKind::Temperature => "temp",
        }
    }

    /// File stem of the model artifact
    pub fn artifact_name(&self) -> &'static str {
        match self {
            PredictorKind::Summary => "summary_forecast_model",
            PredictorKind::PrecipType => "preciptype_forecast_model",
            PredictorKind::Temperature => "temperature_forecast_model",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PredictorKind::Summary => "Weather Summary",
            PredictorKind::PrecipType => "Precipitation Type",
            PredictorKind::Temperature => "Temperature",
        }
    }

    /// Classifiers ship a label decoder alongside the model
    pub fn requires_labels(&self) -> bool {
        !matches!(self, PredictorKind::Temperature)
    }

    pub fn contract(&self) -> InputContract {
        InputContract::for_kind(*self)
    }
}

impl fmt::Display for PredictorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mode())
    }
}

impl FromStr for PredictorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "summary" => Ok(PredictorKind::Summary),
            "precip" | "precip_type" | "precipitation" => Ok(PredictorKind::PrecipType),
            "temp" | "temperature" => Ok(PredictorKind::Temperature),
            other => Err(format!("unknown predictor '{}'", other)),
        }
    }
}

/// One required input field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Feature name in the record
    pub name: &'static str,
    /// Key used by the web form
    pub form_key: &'static str,
    /// Console prompt label
    pub prompt: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn new(name: &'static str, form_key: &'static str, prompt: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            form_key,
            prompt,
            kind,
        }
    }

    /// Convert a raw string into this field's declared type
    pub fn coerce(&self, raw: &str) -> Result<FeatureValue> {
        let trimmed = raw.trim();
        let invalid = || PredictError::TypeCoercion {
            field: self.name.to_string(),
            value: raw.to_string(),
            expected: self.kind,
        };

        match self.kind {
            FieldKind::Float => trimmed
                .parse::<f64>()
                .map(FeatureValue::Number)
                .map_err(|_| invalid()),
            FieldKind::Integer => trimmed
                .parse::<i64>()
                .map(FeatureValue::from)
                .map_err(|_| invalid()),
            FieldKind::Text => Ok(FeatureValue::Category(raw.to_string())),
        }
    }
}

const TEMPERATURE: FieldSpec = FieldSpec::new(fields::TEMPERATURE, "temp", "Temperature (C)", FieldKind::Float);
const APPARENT_TEMPERATURE: FieldSpec = FieldSpec::new(
    fields::APPARENT_TEMPERATURE,
    "apparent_temp",
    "Apparent Temperature (C)",
    FieldKind::Float,
);
const HUMIDITY: FieldSpec = FieldSpec::new(fields::HUMIDITY, "humidity", "Humidity", FieldKind::Float);
const WIND_SPEED: FieldSpec = FieldSpec::new(fields::WIND_SPEED, "wind_speed", "Wind Speed (km/h)", FieldKind::Float);
const WIND_BEARING: FieldSpec = FieldSpec::new(
    fields::WIND_BEARING,
    "wind_bearing",
    "Wind Bearing (degrees)",
    FieldKind::Float,
);
const VISIBILITY: FieldSpec = FieldSpec::new(fields::VISIBILITY, "visibility", "Visibility (km)", FieldKind::Float);
const PRESSURE: FieldSpec = FieldSpec::new(fields::PRESSURE, "pressure", "Pressure (millibars)", FieldKind::Float);
const HOUR: FieldSpec = FieldSpec::new(fields::HOUR, "hour", "Hour (0-23)", FieldKind::Integer);
const MONTH: FieldSpec = FieldSpec::new(fields::MONTH, "month", "Month (1-12)", FieldKind::Integer);
const PRECIP_TYPE: FieldSpec = FieldSpec::new(
    fields::PRECIP_TYPE,
    "precip_type",
    "Precip Type (e.g., rain, snow)",
    FieldKind::Text,
);
const SUMMARY: FieldSpec = FieldSpec::new(
    fields::SUMMARY,
    "summary",
    "Summary (e.g., Overcast, Clear)",
    FieldKind::Text,
);

static SUMMARY_FIELDS: [FieldSpec; 10] = [
    TEMPERATURE,
    APPARENT_TEMPERATURE,
    HUMIDITY,
    WIND_SPEED,
    WIND_BEARING,
    VISIBILITY,
    PRESSURE,
    HOUR,
    MONTH,
    PRECIP_TYPE,
];

static PRECIP_TYPE_FIELDS: [FieldSpec; 9] = [
    TEMPERATURE,
    APPARENT_TEMPERATURE,
    HUMIDITY,
    WIND_SPEED,
    WIND_BEARING,
    VISIBILITY,
    PRESSURE,
    HOUR,
    MONTH,
];

static TEMPERATURE_FIELDS: [FieldSpec; 11] = [
    TEMPERATURE,
    APPARENT_TEMPERATURE,
    HUMIDITY,
    WIND_SPEED,
    WIND_BEARING,
    VISIBILITY,
    PRESSURE,
    HOUR,
    MONTH,
    SUMMARY,
    PRECIP_TYPE,
];

/// The required field set of one predictor variant
#[derive(Debug, Clone, Copy)]
pub struct InputContract {
    kind: PredictorKind,
    fields: &'static [FieldSpec],
}

impl InputContract {
    pub fn for_kind(kind: PredictorKind) -> Self {
        let fields: &'static [FieldSpec] = match kind {
            PredictorKind::Summary => &SUMMARY_FIELDS,
            PredictorKind::PrecipType => &PRECIP_TYPE_FIELDS,
            PredictorKind::Temperature => &TEMPERATURE_FIELDS,
        };
        Self { kind, fields }
    }

    pub fn kind(&self) -> PredictorKind {
        self.kind
    }

    /// Fields in collection order
    pub fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// True if a model column may reference this feature
    pub fn accepts_feature(&self, name: &str) -> bool {
        self.field(name).is_some() || fields::CYCLICAL.contains(&name)
    }

    /// Check that every required field is present with the right kind
    pub fn validate(&self, record: &FeatureRecord) -> Result<()> {
        for spec in self.fields {
            let value = record
                .get(spec.name)
                .ok_or_else(|| PredictError::MissingField(spec.name.to_string()))?;
            let kind_matches = match (value, spec.kind) {
                (FeatureValue::Number(_), FieldKind::Float) => true,
                (FeatureValue::Number(v), FieldKind::Integer) => v.fract() == 0.0,
                (FeatureValue::Category(_), FieldKind::Text) => true,
                _ => false,
            };
            if !kind_matches {
                return Err(PredictError::WrongKind {
                    field: spec.name.to_string(),
                    expected: spec.kind,
                });
            }
        }
        Ok(())
    }

    /// Build a record from raw form values keyed by `form_key`
    ///
    /// Fields are coerced in contract order and the first failure is returned.
    pub fn coerce_form(&self, form: &HashMap<String, String>) -> Result<FeatureRecord> {
        self.coerce_with(|spec| form.get(spec.form_key).map(String::as_str))
    }

    /// Build a record using an arbitrary lookup for each field's raw value
    pub fn coerce_with<'a, F>(&self, mut lookup: F) -> Result<FeatureRecord>
    where
        F: FnMut(&FieldSpec) -> Option<&'a str>,
    {
        let mut record = FeatureRecord::new();
        for spec in self.fields {
            let raw = lookup(spec).ok_or_else(|| PredictError::MissingField(spec.name.to_string()))?;
            record.insert(spec.name, spec.coerce(raw)?);
        }
        Ok(record)
    }
}
