//! Stateless prediction serving.
//!
//! [`PredictionService`] is an explicit, immutable context constructed once at process start.
//! Loading the artifact either succeeds — the service is *ready* — or fails, leaving it
//! permanently *unready* for this process without crashing it. There is no transition back:
//! per-request failures are per-request errors. Because the loaded model never changes,
//! concurrent requests can share the service without any locking.
//!
//! The request and response types are the wire contract; transport (HTTP framing, CORS, ...)
//! is left to an embedding server, which maps [`Error::status`](crate::error::Error::status)
//! to its status codes and [`ErrorResponse`] to its failure body.

use serde::{Deserialize, Serialize};

use std::path::Path;

use crate::error::{Error, Result};
use crate::landmark::{Landmarks, NUM_LANDMARKS};
use crate::strategy::{ClassificationStrategy, LandmarkFeatureStrategy};
use crate::ModelArtifact;

/// One landmark of an inference request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// An inference request: the 21 landmarks of one detected hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub landmarks: Vec<LandmarkPoint>,
}

/// A successful prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub prediction: String,
    pub confidence: f32,
}

/// The failure body of the wire contract.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&Error> for ErrorResponse {
    fn from(e: &Error) -> Self {
        Self {
            error: e.to_string(),
        }
    }
}

/// Health query response.
#[derive(Debug, Clone, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub model_loaded: bool,
    pub classes: usize,
}

enum State {
    Ready(Box<dyn ClassificationStrategy>),
    Unready { reason: String },
}

/// The serving context: one loaded (or failed-to-load) classification strategy.
pub struct PredictionService {
    state: State,
}

impl PredictionService {
    /// Loads the model artifact from `dir` at startup.
    ///
    /// This never fails: a missing or invalid artifact produces an unready service whose
    /// health endpoint reports `model_loaded: false` and whose predictions are rejected with
    /// [`Error::ModelUnavailable`].
    pub fn load(dir: &Path) -> Self {
        match ModelArtifact::load(dir) {
            Ok(artifact) => {
                log::info!(
                    "model loaded from {}: {} classes, trained on {} samples",
                    dir.display(),
                    artifact.metadata().num_classes,
                    artifact.metadata().total_samples,
                );
                Self::with_strategy(Box::new(LandmarkFeatureStrategy::new(artifact)))
            }
            Err(e) => {
                log::error!("{e}");
                Self {
                    state: State::Unready {
                        reason: e.to_string(),
                    },
                }
            }
        }
    }

    /// Creates a ready service around an arbitrary strategy.
    pub fn with_strategy(strategy: Box<dyn ClassificationStrategy>) -> Self {
        Self {
            state: State::Ready(strategy),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    /// Why the service is unready, if it is.
    pub fn unready_reason(&self) -> Option<&str> {
        match &self.state {
            State::Ready(_) => None,
            State::Unready { reason } => Some(reason),
        }
    }

    pub fn health(&self) -> Health {
        match &self.state {
            State::Ready(strategy) => Health {
                status: "healthy",
                model_loaded: true,
                classes: strategy.classes(),
            },
            State::Unready { .. } => Health {
                status: "degraded",
                model_loaded: false,
                classes: 0,
            },
        }
    }

    /// Handles one prediction request.
    ///
    /// Unready services reject immediately, before the landmarks are even looked at. Requests
    /// without exactly 21 landmarks are rejected with a validation error and never reach the
    /// classifier. Classification failures are recovered here and logged; they never poison
    /// the service.
    pub fn predict(&self, request: &PredictRequest) -> Result<Prediction> {
        let strategy = match &self.state {
            State::Ready(strategy) => strategy,
            State::Unready { .. } => return Err(Error::ModelUnavailable),
        };

        if request.landmarks.len() != NUM_LANDMARKS {
            return Err(Error::Validation(format!(
                "expected {NUM_LANDMARKS} landmarks, got {}",
                request.landmarks.len(),
            )));
        }

        let coords: Vec<[f32; 3]> = request
            .landmarks
            .iter()
            .map(|p| [p.x, p.y, p.z])
            .collect();
        let landmarks = Landmarks::from_coords(&coords).unwrap();

        let features = strategy.preprocess(&landmarks);
        let result = strategy.classify(&features).map_err(|e| {
            log::error!("prediction failed: {e}");
            e
        })?;

        log::debug!(
            "predicted {} with confidence {:.3}",
            result.letter,
            result.confidence,
        );
        Ok(Prediction {
            prediction: result.letter,
            confidence: result.confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::feature::FEATURE_DIM;
    use crate::strategy::Classification;

    use super::*;

    /// Counts classifier invocations so tests can prove when it is never reached.
    struct CountingStrategy {
        classify_calls: Arc<AtomicUsize>,
        distribution: Vec<f32>,
    }

    impl ClassificationStrategy for CountingStrategy {
        fn preprocess(&self, landmarks: &Landmarks) -> [f32; FEATURE_DIM] {
            crate::feature::normalize(landmarks)
        }

        fn classify(&self, _features: &[f32; FEATURE_DIM]) -> Result<Classification> {
            self.classify_calls.fetch_add(1, Ordering::SeqCst);
            let predicted = crate::forest::argmax(&self.distribution);
            Ok(Classification {
                letter: "B".to_string(),
                confidence: self.distribution[predicted],
            })
        }

        fn classes(&self) -> usize {
            self.distribution.len()
        }
    }

    fn counting_service(distribution: Vec<f32>) -> (PredictionService, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = PredictionService::with_strategy(Box::new(CountingStrategy {
            classify_calls: calls.clone(),
            distribution,
        }));
        (service, calls)
    }

    fn request(landmarks: usize) -> PredictRequest {
        PredictRequest {
            landmarks: vec![
                LandmarkPoint {
                    x: 0.5,
                    y: 0.5,
                    z: 0.0
                };
                landmarks
            ],
        }
    }

    #[test]
    fn wrong_landmark_count_never_reaches_classifier() {
        let (service, calls) = counting_service(vec![0.1, 0.9]);

        let err = service.predict(&request(20)).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(err.status(), 400);

        let err = service.predict(&request(22)).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn valid_request_is_classified_once() {
        let (service, calls) = counting_service(vec![0.25, 0.75]);

        let prediction = service.predict(&request(21)).unwrap();
        assert_eq!(prediction.prediction, "B");
        assert_eq!(prediction.confidence, 0.75);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unready_service_rejects_without_normalizing() {
        let service = PredictionService::load(Path::new("/nonexistent/artifact"));
        assert!(!service.is_ready());
        assert!(service.unready_reason().is_some());

        let health = service.health();
        assert!(!health.model_loaded);
        assert_eq!(health.classes, 0);

        let err = service.predict(&request(21)).unwrap_err();
        assert!(matches!(err, Error::ModelUnavailable));
        assert_eq!(err.status(), 503);

        // Even malformed requests get the unavailability answer first.
        let err = service.predict(&request(3)).unwrap_err();
        assert!(matches!(err, Error::ModelUnavailable));
    }

    #[test]
    fn health_reports_class_count_when_ready() {
        let (service, _) = counting_service(vec![0.5; 24]);
        let health = service.health();
        assert!(health.model_loaded);
        assert_eq!(health.status, "healthy");
        assert_eq!(health.classes, 24);
    }

    #[test]
    fn wire_shapes_serialize_as_contracted() {
        let prediction = Prediction {
            prediction: "C".to_string(),
            confidence: 0.875,
        };
        assert_eq!(
            serde_json::to_string(&prediction).unwrap(),
            r#"{"prediction":"C","confidence":0.875}"#
        );

        let err = ErrorResponse::from(&Error::ModelUnavailable);
        assert_eq!(
            serde_json::to_string(&err).unwrap(),
            r#"{"error":"model not loaded"}"#
        );

        let request: PredictRequest =
            serde_json::from_str(r#"{"landmarks": [{"x": 0.1, "y": 0.2, "z": 0.3}]}"#).unwrap();
        assert_eq!(request.landmarks.len(), 1);

        // A point without its z coordinate is malformed and fails to parse.
        assert!(serde_json::from_str::<PredictRequest>(
            r#"{"landmarks": [{"x": 0.1, "y": 0.2}]}"#
        )
        .is_err());
    }
}
