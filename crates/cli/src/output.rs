//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use predictor_lib::predictor::{CyclicalFeatures, PredictionResult};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// Parse the `default_format` value from the config file
    pub fn from_config(value: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(value, true).ok()
    }
}

/// Row for the prediction table
#[derive(Tabled)]
struct PredictionRow {
    #[tabled(rename = "Predictor")]
    predictor: String,
    #[tabled(rename = "Prediction")]
    prediction: String,
    #[tabled(rename = "Model")]
    model_version: String,
    #[tabled(rename = "Generated")]
    generated_at: String,
}

/// Row for the cyclical feature table
#[derive(Tabled)]
struct FeatureRow {
    #[tabled(rename = "Feature")]
    name: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

/// Render a table from a list of rows
fn render_table<T: Tabled>(rows: Vec<T>) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn format_timestamp(timestamp: i64) -> String {
    chrono::DateTime::from_timestamp(timestamp, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

/// Render a prediction in the requested format
pub fn render_prediction(result: &PredictionResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => render_json(result),
        OutputFormat::Table => Ok(render_table(vec![PredictionRow {
            predictor: result.kind.display_name().to_string(),
            prediction: result.display_value(),
            model_version: result.model_version.clone(),
            generated_at: format_timestamp(result.generated_at),
        }])),
    }
}

/// Render the four cyclical features in the requested format
pub fn render_features(features: &CyclicalFeatures, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => render_json(features),
        OutputFormat::Table => {
            let rows = vec![
                FeatureRow {
                    name: "hour_sin",
                    value: format!("{:.6}", features.hour_sin),
                },
                FeatureRow {
                    name: "hour_cos",
                    value: format!("{:.6}", features.hour_cos),
                },
                FeatureRow {
                    name: "month_sin",
                    value: format!("{:.6}", features.month_sin),
                },
                FeatureRow {
                    name: "month_cos",
                    value: format!("{:.6}", features.month_cos),
                },
            ];
            Ok(render_table(rows))
        }
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}
