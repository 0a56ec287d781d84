//! Crop recommendation models

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use validator::Validate;

use crate::validation::{numeric_value, required};

/// Wire names of the classifier inputs, in model column order
pub const FEATURE_NAMES: [&str; 7] = ["N", "P", "K", "temperature", "humidity", "ph", "rainfall"];

/// Number of ranked alternatives returned with every prediction
pub const TOP_RECOMMENDATIONS: usize = 3;

/// Soil and climate readings fed to the classifier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate, PartialEq)]
pub struct CropFeatures {
    /// Nitrogen ratio in soil
    #[serde(rename = "N")]
    #[validate(range(min = 0.0))]
    pub n: f64,
    /// Phosphorus ratio in soil
    #[serde(rename = "P")]
    #[validate(range(min = 0.0))]
    pub p: f64,
    /// Potassium ratio in soil
    #[serde(rename = "K")]
    #[validate(range(min = 0.0))]
    pub k: f64,
    /// Degrees Celsius, range checked in `check_ranges`
    pub temperature: f64,
    /// Relative humidity in percent
    #[validate(range(min = 0.0, max = 100.0))]
    pub humidity: f64,
    #[validate(range(min = 0.0, max = 14.0))]
    pub ph: f64,
    /// Millimetres
    #[validate(range(min = 0.0))]
    pub rainfall: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum FeatureError {
    #[error("Missing required feature: {0}")]
    Missing(&'static str),

    #[error("Invalid value for feature {0}: expected a number")]
    NotNumeric(&'static str),

    #[error("Feature {feature} is out of range: {message}")]
    OutOfRange {
        feature: &'static str,
        message: String,
    },
}

impl FeatureError {
    /// Wire name of the offending feature
    pub fn feature(&self) -> &'static str {
        match self {
            FeatureError::Missing(f) | FeatureError::NotNumeric(f) => f,
            FeatureError::OutOfRange { feature, .. } => feature,
        }
    }
}

impl CropFeatures {
    /// Read the seven features from a JSON body, checking presence in column
    /// order so the first missing one is reported
    pub fn from_json(body: &Map<String, Value>) -> Result<Self, FeatureError> {
        let mut values = [0.0_f64; 7];
        for (slot, name) in values.iter_mut().zip(FEATURE_NAMES) {
            let raw = required(body, name).ok_or(FeatureError::Missing(name))?;
            *slot = numeric_value(raw).ok_or(FeatureError::NotNumeric(name))?;
        }

        let features = Self::from_array(values);
        features.check_ranges()?;
        Ok(features)
    }

    pub fn from_array(values: [f64; 7]) -> Self {
        let [n, p, k, temperature, humidity, ph, rainfall] = values;
        Self {
            n,
            p,
            k,
            temperature,
            humidity,
            ph,
            rainfall,
        }
    }

    /// Features in model column order
    pub fn as_array(&self) -> [f64; 7] {
        [
            self.n,
            self.p,
            self.k,
            self.temperature,
            self.humidity,
            self.ph,
            self.rainfall,
        ]
    }

    /// Reject physically impossible readings
    pub fn check_ranges(&self) -> Result<(), FeatureError> {
        let errors = self.validate().err();
        let field_errors = errors
            .as_ref()
            .map(|e| e.field_errors())
            .unwrap_or_default();

        // Report in column order, not hash order
        for name in FEATURE_NAMES {
            let failed = match name {
                "temperature" => !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&self.temperature),
                _ => field_errors.contains_key(field_name(name)),
            };
            if failed {
                return Err(FeatureError::OutOfRange {
                    feature: name,
                    message: describe_range(name).to_string(),
                });
            }
        }
        Ok(())
    }
}

const MIN_TEMPERATURE: f64 = -60.0;
const MAX_TEMPERATURE: f64 = 60.0;

fn field_name(wire: &'static str) -> &'static str {
    match wire {
        "N" => "n",
        "P" => "p",
        "K" => "k",
        other => other,
    }
}

fn describe_range(wire: &str) -> &'static str {
    match wire {
        "temperature" => "must be between -60 and 60",
        "humidity" => "must be between 0 and 100",
        "ph" => "must be between 0 and 14",
        _ => "must not be negative",
    }
}

/// One ranked alternative
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedCrop {
    pub crop: String,
    /// Percentage, 2 decimal places
    #[serde(with = "rust_decimal::serde::float")]
    pub confidence: Decimal,
}

/// Response body of the recommend-crop endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CropPrediction {
    pub recommended_crop: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub confidence: Decimal,
    pub top_recommendations: Vec<RankedCrop>,
}

/// Convert a probability to a percentage rounded to 2 decimal places
pub fn to_percentage(probability: f64) -> Decimal {
    let clamped = if probability.is_finite() {
        probability.clamp(0.0, 1.0)
    } else {
        0.0
    };
    Decimal::from_f64(clamped * 100.0)
        .unwrap_or(Decimal::ZERO)
        .round_dp(2)
}

/// Pick the `k` most probable classes, highest first
///
/// Equal probabilities keep the classes' original order.
pub fn rank_top(classes: &[String], probabilities: &[f64], k: usize) -> Vec<RankedCrop> {
    let mut order: Vec<usize> = (0..classes.len().min(probabilities.len())).collect();
    order.sort_by(|&a, &b| probabilities[b].total_cmp(&probabilities[a]));

    order
        .into_iter()
        .take(k)
        .map(|i| RankedCrop {
            crop: classes[i].clone(),
            confidence: to_percentage(probabilities[i]),
        })
        .collect()
}
