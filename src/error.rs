//! Crate-wide error taxonomy.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The model artifact (or its metadata) was missing, unreadable, or inconsistent at load
    /// time. This leaves the serving side permanently unready for the lifetime of the process,
    /// but never crashes it.
    #[error("model artifact failed to load: {0}")]
    StartupLoad(String),

    /// A malformed prediction request. Rejected before the normalizer or classifier runs.
    #[error("{0}")]
    Validation(String),

    /// A prediction was attempted while no model is loaded.
    #[error("model not loaded")]
    ModelUnavailable,

    /// Unexpected failure during normalization or classification. Recovered at the request
    /// boundary; the process keeps serving.
    #[error("inference failed: {0}")]
    Inference(String),

    /// The extraction pipeline produced fewer samples than the training minimum. Fatal to the
    /// training run; no artifact is written.
    #[error("too few samples extracted: got {got}, need at least {required}")]
    InsufficientData { got: usize, required: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the HTTP-style status code a transport adapter should answer with.
    pub fn status(&self) -> u16 {
        match self {
            Error::Validation(_) | Error::Json(_) => 400,
            Error::ModelUnavailable => 503,
            _ => 500,
        }
    }
}
