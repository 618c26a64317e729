//! One-shot prediction from command-line flags

use crate::output::{print_success, render_prediction, OutputFormat};
use anyhow::{Context, Result};
use clap::Args;
use predictor_lib::{
    predictor::{load_predictor, PredictionResult, PredictorKind},
    FeatureRecord, PrecipTypeInput, SummaryInput, TemperatureInput, WeatherObservation,
};
use std::path::Path;
use tracing::info;

/// The nine readings every predictor takes
#[derive(Debug, Clone, Args)]
pub struct ObservationArgs {
    /// Temperature (C)
    #[arg(long = "temp", allow_hyphen_values = true)]
    pub temperature: f64,

    /// Apparent Temperature (C)
    #[arg(long = "apparent-temp", allow_hyphen_values = true)]
    pub apparent_temperature: f64,

    /// Humidity (0-1)
    #[arg(long, allow_hyphen_values = true)]
    pub humidity: f64,

    /// Wind Speed (km/h)
    #[arg(long, allow_hyphen_values = true)]
    pub wind_speed: f64,

    /// Wind Bearing (degrees)
    #[arg(long, allow_hyphen_values = true)]
    pub wind_bearing: f64,

    /// Visibility (km)
    #[arg(long, allow_hyphen_values = true)]
    pub visibility: f64,

    /// Pressure (millibars)
    #[arg(long, allow_hyphen_values = true)]
    pub pressure: f64,

    /// Hour (0-23)
    #[arg(long, allow_hyphen_values = true)]
    pub hour: i64,

    /// Month (1-12)
    #[arg(long, allow_hyphen_values = true)]
    pub month: i64,
}

impl From<&ObservationArgs> for WeatherObservation {
    fn from(args: &ObservationArgs) -> Self {
        WeatherObservation {
            temperature_c: args.temperature,
            apparent_temperature_c: args.apparent_temperature,
            humidity: args.humidity,
            wind_speed_kmh: args.wind_speed,
            wind_bearing_degrees: args.wind_bearing,
            visibility_km: args.visibility,
            pressure_millibars: args.pressure,
            hour: args.hour,
            month: args.month,
        }
    }
}

/// Build the typed input for a variant and flatten it into a record
pub fn summary_record(observation: &ObservationArgs, precip_type: &str) -> FeatureRecord {
    FeatureRecord::from(&SummaryInput {
        observation: observation.into(),
        precip_type: precip_type.to_string(),
    })
}

pub fn precip_record(observation: &ObservationArgs) -> FeatureRecord {
    FeatureRecord::from(&PrecipTypeInput {
        observation: observation.into(),
    })
}

pub fn temperature_record(observation: &ObservationArgs, summary: &str, precip_type: &str) -> FeatureRecord {
    FeatureRecord::from(&TemperatureInput {
        observation: observation.into(),
        summary: summary.to_string(),
        precip_type: precip_type.to_string(),
    })
}

/// Load one predictor and run it on a record
pub fn run_prediction(
    model_dir: &Path,
    kind: PredictorKind,
    record: &FeatureRecord,
) -> Result<PredictionResult> {
    let predictor = load_predictor(kind, model_dir)
        .with_context(|| format!("Failed to load {} predictor", kind.display_name()))?;
    info!(predictor = %kind, version = %predictor.model_version(), "Predictor loaded");

    predictor
        .predict_record(record)
        .with_context(|| format!("{} prediction failed", kind.display_name()))
}

/// Predict and print the result
pub fn predict(
    model_dir: &Path,
    kind: PredictorKind,
    record: &FeatureRecord,
    format: OutputFormat,
) -> Result<()> {
    let result = run_prediction(model_dir, kind, record)?;
    if format == OutputFormat::Table {
        print_success(&result.headline());
    }
    println!("{}", render_prediction(&result, format)?);
    Ok(())
}
