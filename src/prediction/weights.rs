use chrono::{DateTime, Utc};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::features::FeatureExtractor;
use crate::errors::EngineError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedWeight {
    pub feature: String,
    pub weight: f64,
}

/// Persisted model state: one named weight per feature, plus the bias
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelWeights {
    pub model_name: String,
    /// Schema id of the feature layout the weights were learned on
    pub schema: String,
    pub bias: f64,
    pub weights: Vec<NamedWeight>,
    pub last_updated: DateTime<Utc>,
}

impl ModelWeights {
    /// Cold-start record with every weight at zero
    pub fn zeroed(model_name: &str, extractor: &FeatureExtractor, now: DateTime<Utc>) -> Self {
        Self::from_vector(model_name, extractor, &Array1::zeros(extractor.len()), now)
    }

    /// Names a weight vector (bias first) using the extractor's feature list
    pub fn from_vector(
        model_name: &str,
        extractor: &FeatureExtractor,
        vector: &Array1<f64>,
        now: DateTime<Utc>,
    ) -> Self {
        let weights = extractor
            .feature_names()
            .iter()
            .zip(vector.iter())
            .skip(1)
            .map(|(feature, &weight)| NamedWeight {
                feature: feature.clone(),
                weight,
            })
            .collect();

        Self {
            model_name: model_name.to_string(),
            schema: extractor.schema().id().to_string(),
            bias: vector.get(0).copied().unwrap_or(0.0),
            weights,
            last_updated: now,
        }
    }

    /// Weight vector aligned to the extractor, after checking the schema id
    /// and every feature name. Never inferred from the vector length.
    pub fn to_vector(&self, extractor: &FeatureExtractor) -> Result<Array1<f64>, EngineError> {
        let expected_schema = extractor.schema().id();
        if self.schema != expected_schema {
            return Err(EngineError::SchemaMismatch {
                model_name: self.model_name.clone(),
                expected: expected_schema.to_string(),
                found: self.schema.clone(),
            });
        }

        let declared = &extractor.feature_names()[1..];
        let names_match = declared.len() == self.weights.len()
            && declared
                .iter()
                .zip(&self.weights)
                .all(|(name, stored)| *name == stored.feature);
        if !names_match {
            return Err(EngineError::FeatureNamesMismatch {
                model_name: self.model_name.clone(),
                schema: self.schema.clone(),
            });
        }

        let values = std::iter::once(self.bias)
            .chain(self.weights.iter().map(|w| w.weight))
            .collect::<Vec<_>>();
        Ok(Array1::from(values))
    }
}
