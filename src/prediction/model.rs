use chrono::{DateTime, Utc};
use log::{debug, info};
use ndarray::Array1;

use super::features::{FeatureExtractor, FeatureVector, MatchContext};
use super::weights::ModelWeights;
use crate::config::ModelSettings;
use crate::errors::EngineError;

/// One labelled example: label is 1.0 when player1 won, else 0.0
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSample {
    pub features: FeatureVector,
    pub label: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingReport {
    pub epochs_run: usize,
    /// Summed absolute error of the last epoch
    pub final_error: f64,
    pub converged: bool,
}

/// Logistic regression over the extractor's feature vector, predicting P(player1 wins)
#[derive(Debug, Clone)]
pub struct PredictionModel {
    model_name: String,
    extractor: FeatureExtractor,
    weights: Array1<f64>,
    learning_rate: f64,
    epochs: usize,
    convergence_threshold: f64,
}

impl PredictionModel {
    /// Untrained model with all weights at zero
    pub fn new(extractor: FeatureExtractor, settings: &ModelSettings) -> Self {
        let weights = Array1::zeros(extractor.len());
        Self {
            model_name: settings.model_name.clone(),
            extractor,
            weights,
            learning_rate: settings.learning_rate,
            epochs: settings.epochs,
            convergence_threshold: settings.convergence_threshold,
        }
    }

    /// Model restored from a persisted record, validated against the extractor
    pub fn from_weights(
        extractor: FeatureExtractor,
        settings: &ModelSettings,
        record: &ModelWeights,
    ) -> Result<Self, EngineError> {
        let weights = record.to_vector(&extractor)?;
        Ok(Self {
            weights,
            ..Self::new(extractor, settings)
        })
    }

    pub fn to_weights(&self, now: DateTime<Utc>) -> ModelWeights {
        ModelWeights::from_vector(&self.model_name, &self.extractor, &self.weights, now)
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<f64, EngineError> {
        self.check_len(features)?;
        Ok(self.probability(features))
    }

    /// Extracts features for the context and predicts on them
    pub fn predict_context(&self, context: &MatchContext) -> f64 {
        self.probability(&self.extractor.extract(context))
    }

    /// Per-sample gradient ascent over the data in input order, for at most
    /// `epochs` passes. Stops after the first pass whose summed absolute error
    /// falls below the convergence threshold.
    ///
    /// All samples are checked before any weight changes.
    pub fn train(&mut self, samples: &[TrainingSample]) -> Result<TrainingReport, EngineError> {
        for sample in samples {
            self.check_len(&sample.features)?;
        }

        let mut report = TrainingReport {
            epochs_run: 0,
            final_error: 0.0,
            converged: false,
        };

        for epoch in 0..self.epochs {
            let total_error: f64 = samples.iter().map(|sample| self.step(sample).abs()).sum();

            report.epochs_run = epoch + 1;
            report.final_error = total_error;

            if total_error < self.convergence_threshold {
                report.converged = true;
                info!(
                    "Training stopped after {} epochs with total error {}",
                    epoch + 1,
                    total_error
                );
                break;
            }
        }

        info!(
            "Trained '{}' on {} samples ({} epochs)",
            self.model_name,
            samples.len(),
            report.epochs_run
        );
        Ok(report)
    }

    /// Single online gradient step for a newly recorded match. Returns the
    /// prediction error before the step.
    pub fn update(&mut self, sample: &TrainingSample) -> Result<f64, EngineError> {
        self.check_len(&sample.features)?;
        let error = self.step(sample);
        debug!("Weights of '{}' after update: {}", self.model_name, self.weights);
        Ok(error)
    }

    fn step(&mut self, sample: &TrainingSample) -> f64 {
        let error = sample.label - self.probability(&sample.features);
        self.weights
            .scaled_add(self.learning_rate * error, sample.features.as_array());
        error
    }

    fn probability(&self, features: &FeatureVector) -> f64 {
        sigmoid(self.weights.dot(features.as_array()))
    }

    fn check_len(&self, features: &FeatureVector) -> Result<(), EngineError> {
        if features.len() != self.weights.len() {
            return Err(EngineError::FeatureLength {
                expected: self.weights.len(),
                actual: features.len(),
            });
        }
        Ok(())
    }
}

pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
