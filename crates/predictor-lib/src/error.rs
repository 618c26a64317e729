//! Error taxonomy for the prediction pipeline

use crate::models::FieldKind;
use thiserror::Error;

/// Errors surfaced by input coercion, model loading and prediction
#[derive(Debug, Error)]
pub enum PredictError {
    /// A raw input string could not be parsed as its declared type
    #[error("could not convert '{value}' for field '{field}' to {expected}")]
    TypeCoercion {
        field: String,
        value: String,
        expected: FieldKind,
    },

    /// A required feature is absent from the record
    #[error("missing required field '{0}'")]
    MissingField(String),

    /// A feature is present but holds the wrong kind of value
    #[error("field '{field}' must be {expected}")]
    WrongKind { field: String, expected: FieldKind },

    /// A model artifact is missing, unreadable or malformed
    #[error("failed to load model artifact '{artifact}': {reason}")]
    Load { artifact: String, reason: String },

    /// The model produced a class index with no label
    #[error("predicted class {0} has no corresponding label")]
    Decode(f64),

    /// The model runtime failed while executing a prediction
    #[error("inference failed: {0}")]
    Inference(String),
}

impl PredictError {
    pub fn load(artifact: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Load {
            artifact: artifact.into(),
            reason: reason.into(),
        }
    }

    /// True for failures caused by malformed user input rather than the model
    pub fn is_type_coercion(&self) -> bool {
        matches!(self, PredictError::TypeCoercion { .. })
    }

    /// True for errors the user can fix by correcting their input
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PredictError::TypeCoercion { .. }
                | PredictError::MissingField(_)
                | PredictError::WrongKind { .. }
        )
    }

    /// Short stable label used for metrics and structured logs
    pub fn kind_label(&self) -> &'static str {
        match self {
            PredictError::TypeCoercion { .. } => "type_coercion",
            PredictError::MissingField(_) => "missing_field",
            PredictError::WrongKind { .. } => "wrong_kind",
            PredictError::Load { .. } => "load",
            PredictError::Decode(_) => "decode",
            PredictError::Inference(_) => "inference",
        }
    }
}

pub type Result<T, E = PredictError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_coercion_classification() {
        let err = PredictError::TypeCoercion {
            field: "Humidity".to_string(),
            value: "wet".to_string(),
            expected: FieldKind::Float,
        };
        assert!(err.is_type_coercion());
        assert!(err.is_input_error());
        assert_eq!(err.kind_label(), "type_coercion");
    }

    #[test]
    fn test_load_error_message() {
        let err = PredictError::load("summary_forecast_model", "file not found");
        assert!(!err.is_input_error());
        assert_eq!(
            err.to_string(),
            "failed to load model artifact 'summary_forecast_model': file not found"
        );
    }

    #[test]
    fn test_missing_field_is_input_error() {
        let err = PredictError::MissingField("Precip Type".to_string());
        assert!(err.is_input_error());
        assert!(!err.is_type_coercion());
        assert!(err.to_string().contains("Precip Type"));
    }
}
