//! Show the cyclical encoding of an hour and month

use crate::output::{render_features, OutputFormat};
use anyhow::Result;
use predictor_lib::predictor::CyclicalFeatures;

pub fn encode(hour: i64, month: i64, format: OutputFormat) -> Result<()> {
    let features = CyclicalFeatures::from_hour_month(hour as f64, month as f64);
    println!("{}", render_features(&features, format)?);
    Ok(())
}
