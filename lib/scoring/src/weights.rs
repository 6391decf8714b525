//! Metric weights for the overall score
//!
//! Weights live outside the calculators: a calculator measures, the weights
//! only decide how much each measurement counts.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Weights of the four metrics in the overall score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoreWeights {
    #[serde(default = "default_coverage")]
    pub field_coverage: f64,
    #[serde(default = "default_type_accuracy")]
    pub type_accuracy: f64,
    #[serde(default = "default_structure")]
    pub structure_score: f64,
    #[serde(default = "default_semantic")]
    pub semantic_score: f64,
}

fn default_coverage() -> f64 {
    ScoreWeights::DEFAULT.field_coverage
}

fn default_type_accuracy() -> f64 {
    ScoreWeights::DEFAULT.type_accuracy
}

fn default_structure() -> f64 {
    ScoreWeights::DEFAULT.structure_score
}

fn default_semantic() -> f64 {
    ScoreWeights::DEFAULT.semantic_score
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl ScoreWeights {
    pub const DEFAULT: ScoreWeights = ScoreWeights {
        field_coverage: 0.30,
        type_accuracy: 0.25,
        structure_score: 0.25,
        semantic_score: 0.20,
    };

    /// Load weights from a JSON file; missing keys keep their default
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, WeightsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| WeightsError::Unreadable(format!("{}: {}", path.display(), e)))?;
        let mut weights: ScoreWeights = serde_json::from_str(&json)
            .map_err(|e| WeightsError::Unreadable(format!("{}: {}", path.display(), e)))?;
        weights.validate_and_normalize()?;
        Ok(weights)
    }

    fn values_mut(&mut self) -> [(&'static str, &mut f64); 4] {
        [
            ("field_coverage", &mut self.field_coverage),
            ("type_accuracy", &mut self.type_accuracy),
            ("structure_score", &mut self.structure_score),
            ("semantic_score", &mut self.semantic_score),
        ]
    }

    pub fn sum(&self) -> f64 {
        self.field_coverage + self.type_accuracy + self.structure_score + self.semantic_score
    }

    /// Validate the weights
    /// - Checks that weights are finite and non-negative
    /// - Normalizes weights to sum to 1.0 if they don't
    pub fn validate_and_normalize(&mut self) -> Result<(), WeightsError> {
        for (name, value) in self.values_mut() {
            if !value.is_finite() || *value < 0.0 {
                return Err(WeightsError::NegativeWeight(name.to_string()));
            }
        }

        let weight_sum = self.sum();
        if weight_sum <= 0.0 {
            return Err(WeightsError::ZeroTotalWeight);
        }

        if (weight_sum - 1.0).abs() > 1e-9 {
            for (_, value) in self.values_mut() {
                *value /= weight_sum;
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum WeightsError {
    #[error("Weight '{0}' must be a non-negative number")]
    NegativeWeight(String),

    #[error("Total weight cannot be zero")]
    ZeroTotalWeight,

    #[error("Cannot load weights: {0}")]
    Unreadable(String),
}
