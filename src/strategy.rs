//! Classification strategies.
//!
//! The serving path is strategy-agnostic: it hands raw landmarks to a
//! [`ClassificationStrategy`] and gets back a letter with a confidence. The landmark-feature
//! strategy below is the production variant; the repository's earlier pixel-based classifiers
//! were superseded by it and are intentionally not carried here.

use crate::artifact::ModelArtifact;
use crate::error::{Error, Result};
use crate::feature::{self, FEATURE_DIM};
use crate::forest::argmax;
use crate::landmark::Landmarks;

/// The outcome of one classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub letter: String,
    /// The probability the model's distribution assigns to the predicted class. Always in
    /// `[0, 1]` and always read from the same distribution that produced the prediction.
    pub confidence: f32,
}

/// A way of turning one hand pose into a letter.
pub trait ClassificationStrategy: Send + Sync {
    /// Derives the strategy's feature representation from raw landmarks.
    fn preprocess(&self, landmarks: &Landmarks) -> [f32; FEATURE_DIM];

    /// Classifies a preprocessed feature vector.
    fn classify(&self, features: &[f32; FEATURE_DIM]) -> Result<Classification>;

    /// Number of classes this strategy distinguishes.
    fn classes(&self) -> usize;
}

/// Classifies the geometric shape of the hand via normalized landmark features.
pub struct LandmarkFeatureStrategy {
    artifact: ModelArtifact,
}

impl LandmarkFeatureStrategy {
    pub fn new(artifact: ModelArtifact) -> Self {
        Self { artifact }
    }
}

impl ClassificationStrategy for LandmarkFeatureStrategy {
    fn preprocess(&self, landmarks: &Landmarks) -> [f32; FEATURE_DIM] {
        feature::normalize(landmarks)
    }

    fn classify(&self, features: &[f32; FEATURE_DIM]) -> Result<Classification> {
        let distribution = self.artifact.forest().predict_proba(features);
        let predicted = argmax(&distribution);
        let letter = self.artifact.label(predicted).ok_or_else(|| {
            Error::Inference(format!("predicted class {predicted} has no label"))
        })?;

        Ok(Classification {
            letter: letter.to_string(),
            confidence: distribution[predicted],
        })
    }

    fn classes(&self) -> usize {
        self.artifact.metadata().num_classes
    }
}
