//! ONNX inference using tract
//!
//! Runs the exported weather models on a single feature row. Classifiers
//! emit an integer class index, the regressor a float; both are read back
//! as `f64`.

use crate::error::{PredictError, Result};
use anyhow::Context;
use std::time::Instant;
use tract_onnx::prelude::*;
use tracing::{debug, warn};

/// Maximum inference latency before warning
const MAX_INFERENCE_MS: u128 = 5;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// An opaque trained model evaluated on one row at a time
pub trait Model: Send + Sync {
    /// Evaluate one row and return the first output value
    fn predict_row(&self, row: &[f32]) -> Result<f64>;

    /// Number of input columns the model expects, if known
    fn input_width(&self) -> Option<usize> {
        None
    }
}

/// ONNX model compiled into a tract execution plan
pub struct OnnxModel {
    plan: TractModel,
    width: usize,
}

impl OnnxModel {
    /// Parse and optimize an ONNX graph taking an `f32[1, width]` input
    pub fn from_bytes(model_bytes: &[u8], width: usize) -> anyhow::Result<Self> {
        let plan = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .context("Failed to parse ONNX model")?
            .with_input_fact(0, f32::fact([1, width]).into())
            .context("Failed to set input shape")?
            .into_optimized()
            .context("Failed to optimize model")?
            .into_runnable()
            .context("Failed to create runnable model")?;
        Ok(Self { plan, width })
    }

    fn row_to_tensor(&self, row: &[f32]) -> Result<Tensor> {
        tract_ndarray::Array2::from_shape_vec((1, self.width), row.to_vec())
            .map(Tensor::from)
            .map_err(|e| {
                PredictError::Inference(format!(
                    "row has {} values, model expects {}: {}",
                    row.len(),
                    self.width,
                    e
                ))
            })
    }
}

impl Model for OnnxModel {
    fn predict_row(&self, row: &[f32]) -> Result<f64> {
        let start = Instant::now();
        let input = self.row_to_tensor(row)?;

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| PredictError::Inference(format!("{:#}", e)))?;
        let output = outputs
            .first()
            .ok_or_else(|| PredictError::Inference("model produced no output".to_string()))?;

        let as_float = output
            .cast_to::<f32>()
            .map_err(|e| PredictError::Inference(format!("unsupported output type: {:#}", e)))?;
        let view = as_float
            .to_array_view::<f32>()
            .map_err(|e| PredictError::Inference(format!("{:#}", e)))?;
        let value = view
            .iter()
            .next()
            .copied()
            .ok_or_else(|| PredictError::Inference("model output is empty".to_string()))?;

        let elapsed = start.elapsed();
        if elapsed.as_millis() > MAX_INFERENCE_MS {
            warn!(elapsed_ms = elapsed.as_millis(), "Inference exceeded {}ms target", MAX_INFERENCE_MS);
        } else {
            debug!(elapsed_us = elapsed.as_micros(), "Inference completed");
        }

        Ok(value as f64)
    }

    fn input_width(&self) -> Option<usize> {
        Some(self.width)
    }
}

/// Model that ignores its input and always returns the same value
///
/// Stands in for a real artifact in dry runs and tests.
#[derive(Debug, Clone, Copy)]
pub struct ConstantModel(pub f64);

impl Model for ConstantModel {
    fn predict_row(&self, _row: &[f32]) -> Result<f64> {
        Ok(self.0)
    }
}
