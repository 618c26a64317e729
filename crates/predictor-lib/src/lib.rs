//! Weather prediction library
//!
//! This crate provides the core functionality for:
//! - Typed weather observations and feature records
//! - Cyclical feature encoding of hour and month
//! - Loading ONNX model artifacts with their label decoders
//! - The summary, precipitation-type and temperature predictors
//! - Health checks and observability

pub mod error;
pub mod health;
pub mod models;
pub mod observability;
pub mod predictor;

pub use error::PredictError;
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{ServiceMetrics, StructuredLogger};
