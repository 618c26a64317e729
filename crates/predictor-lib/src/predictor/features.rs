//! Cyclical feature encoding
//!
//! Maps hour-of-day and month-of-year onto the unit circle so that values
//! adjacent in time stay numerically close across the wrap-around boundary.

use crate::error::{PredictError, Result};
use crate::models::{fields, FeatureRecord, FeatureValue, FieldKind};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Period of the hour feature
pub const HOURS_PER_DAY: f64 = 24.0;

/// Period of the month feature
pub const MONTHS_PER_YEAR: f64 = 12.0;

/// The four derived features
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CyclicalFeatures {
    pub hour_sin: f64,
    pub hour_cos: f64,
    pub month_sin: f64,
    pub month_cos: f64,
}

impl CyclicalFeatures {
    /// No range validation: out-of-range values still encode
    pub fn from_hour_month(hour: f64, month: f64) -> Self {
        let hour_angle = 2.0 * PI * hour / HOURS_PER_DAY;
        let month_angle = 2.0 * PI * month / MONTHS_PER_YEAR;
        Self {
            hour_sin: hour_angle.sin(),
            hour_cos: hour_angle.cos(),
            month_sin: month_angle.sin(),
            month_cos: month_angle.cos(),
        }
    }

    /// Look up a derived feature by name
    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            fields::HOUR_SIN => Some(self.hour_sin),
            fields::HOUR_COS => Some(self.hour_cos),
            fields::MONTH_SIN => Some(self.month_sin),
            fields::MONTH_COS => Some(self.month_cos),
            _ => None,
        }
    }
}

/// A feature record extended with its cyclical features
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFeatureRecord {
    record: FeatureRecord,
    cyclical: CyclicalFeatures,
}

impl EncodedFeatureRecord {
    pub fn record(&self) -> &FeatureRecord {
        &self.record
    }

    pub fn cyclical(&self) -> &CyclicalFeatures {
        &self.cyclical
    }

    /// Numeric feature lookup; derived features take precedence
    pub fn number(&self, name: &str) -> Result<f64> {
        match self.cyclical.get(name) {
            Some(v) => Ok(v),
            None => self.record.number(name),
        }
    }

    pub fn category(&self, name: &str) -> Result<&str> {
        self.record.category(name)
    }

    /// Flatten into a plain record carrying all original and derived fields
    pub fn into_record(self) -> FeatureRecord {
        let mut record = self.record;
        for name in fields::CYCLICAL {
            if let Some(v) = self.cyclical.get(name) {
                record.insert(name, FeatureValue::Number(v));
            }
        }
        record
    }
}

/// Stateless encoder shared by every predictor
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureEncoder;

impl FeatureEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Derive the cyclical features; the input record is left untouched
    pub fn encode(&self, record: &FeatureRecord) -> Result<EncodedFeatureRecord> {
        let hour = record.number(fields::HOUR)?;
        let month = record.number(fields::MONTH)?;
        if !hour.is_finite() || !month.is_finite() {
            return Err(PredictError::WrongKind {
                field: if hour.is_finite() { fields::MONTH } else { fields::HOUR }.to_string(),
                expected: FieldKind::Integer,
            });
        }

        Ok(EncodedFeatureRecord {
            record: record.clone(),
            cyclical: CyclicalFeatures::from_hour_month(hour, month),
        })
    }
}

/// Shorthand for `FeatureEncoder::new().encode(record)`
pub fn encode(record: &FeatureRecord) -> Result<EncodedFeatureRecord> {
    FeatureEncoder.encode(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn record(hour: i64, month: i64) -> FeatureRecord {
        FeatureRecord::new()
            .with(fields::TEMPERATURE, 15.2)
            .with(fields::HOUR, hour)
            .with(fields::MONTH, month)
            .with(fields::PRECIP_TYPE, "rain")
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn test_hour_periodicity() {
        for h in 0..24 {
            let base = encode(&record(h, 6)).unwrap();
            for k in [-2i64, -1, 1, 3] {
                let shifted = encode(&record(h + 24 * k, 6)).unwrap();
                assert!(close(base.cyclical().hour_sin, shifted.cyclical().hour_sin), "h={} k={}", h, k);
                assert!(close(base.cyclical().hour_cos, shifted.cyclical().hour_cos), "h={} k={}", h, k);
            }
        }
    }

    #[test]
    fn test_month_periodicity() {
        for m in 1..=12 {
            let base = encode(&record(0, m)).unwrap();
            for k in [-1i64, 1, 2] {
                let shifted = encode(&record(0, m + 12 * k)).unwrap();
                assert!(close(base.cyclical().month_sin, shifted.cyclical().month_sin));
                assert!(close(base.cyclical().month_cos, shifted.cyclical().month_cos));
            }
        }
    }

    #[test]
    fn test_boundary_values() {
        let c = encode(&record(0, 12)).unwrap().cyclical;
        assert!(close(c.hour_sin, 0.0));
        assert!(close(c.hour_cos, 1.0));
        assert!(close(c.month_sin, 0.0));
        assert!(close(c.month_cos, 1.0));

        // January sits one twelfth of the way around the circle
        let jan = encode(&record(0, 1)).unwrap().cyclical;
        assert!(close(jan.month_sin, 0.5));
        assert!(close(jan.month_cos, 3f64.sqrt() / 2.0));
    }

    #[test]
    fn test_afternoon_in_november() {
        let c = encode(&record(14, 11)).unwrap().cyclical;
        assert!(close(c.hour_sin, -0.5));
        assert!(close(c.hour_cos, -(3f64.sqrt()) / 2.0));
        assert!(close(c.month_sin, -0.5));
        assert!(close(c.month_cos, 3f64.sqrt() / 2.0));
    }

    #[test]
    fn test_matches_formula_bit_for_bit() {
        let c = encode(&record(7, 3)).unwrap().cyclical;
        assert_eq!(c.hour_sin.to_bits(), (2.0 * PI * 7.0 / 24.0).sin().to_bits());
        assert_eq!(c.month_cos.to_bits(), (2.0 * PI * 3.0 / 12.0).cos().to_bits());
    }

    #[test]
    fn test_encoding_is_pure() {
        let input = record(9, 4);
        let snapshot = input.clone();
        let first = encode(&input).unwrap();
        let second = encode(&input).unwrap();

        assert_eq!(input, snapshot);
        assert_eq!(first.cyclical().hour_sin.to_bits(), second.cyclical().hour_sin.to_bits());
        assert_eq!(first.cyclical().month_cos.to_bits(), second.cyclical().month_cos.to_bits());
        assert_eq!(first, second);
    }

    #[test]
    fn test_reencoding_is_idempotent() {
        let once = encode(&record(22, 8)).unwrap();
        let twice = encode(&once.clone().into_record()).unwrap();
        assert_eq!(once.cyclical(), twice.cyclical());
        assert_eq!(twice.into_record().len(), record(22, 8).len() + 4);
    }

    #[test]
    fn test_passthrough_fields() {
        let encoded = encode(&record(1, 2)).unwrap();
        assert_eq!(encoded.number(fields::TEMPERATURE).unwrap(), 15.2);
        assert_eq!(encoded.category(fields::PRECIP_TYPE).unwrap(), "rain");
        assert_eq!(encoded.number(fields::HOUR_SIN).unwrap(), encoded.cyclical().hour_sin);
    }

    #[test]
    fn test_out_of_range_accepted() {
        assert!(encode(&record(-5, 40)).is_ok());
        assert!(encode(&record(100, 0)).is_ok());
    }

    #[test]
    fn test_missing_hour_rejected() {
        let mut input = record(1, 1);
        input.remove(fields::HOUR);
        assert!(matches!(
            encode(&input),
            Err(PredictError::MissingField(f)) if f == fields::HOUR
        ));
    }
}
