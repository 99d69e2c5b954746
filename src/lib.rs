//! Static fingerspelling recognition from hand landmarks.
//!
//! One hand pose — 21 3D landmarks from an external pose detector — is classified into one of
//! 24 static alphabet letters (J and Z require motion and are excluded). The crate has two
//! halves built on the same geometric transform:
//!
//! * an offline pipeline ([`dataset`] → [`train`] → [`artifact`]) that turns a labeled image
//!   corpus into a persisted classifier, and
//! * a stateless serving path ([`service`]) that turns one landmark set into a letter with a
//!   confidence.
//!
//! Both sides share [`feature::normalize`], so the transform applied at serving time is the
//! same one the classifier was trained on.
//!
//! # Coordinates
//!
//! Landmark coordinates are expected in the source image's normalized space (`x`/`y` in
//! `[0, 1]`, `z` relative depth), but the normalizer removes position and scale anyway, so any
//! consistent coordinate space works.
//!
//! # Environment Variables
//!
//! The training binary reads two overrides:
//!
//! * `FINGERSPELL_DATASET`: corpus root with one directory per letter.
//! * `FINGERSPELL_MODEL_DIR`: output directory for the model artifact.

use log::LevelFilter;

pub mod artifact;
pub mod dataset;
pub mod detector;
pub mod error;
pub mod feature;
pub mod forest;
pub mod landmark;
pub mod service;
pub mod strategy;
pub mod train;

pub use artifact::ModelArtifact;
pub use error::{Error, Result};
pub use landmark::{Landmarks, NUM_LANDMARKS};
pub use service::PredictionService;

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = LevelFilter::Debug;
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_PKG_NAME")), log_level)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// The calling crate and this crate log at *debug* level; `RUST_LOG` overrides still apply.
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}
