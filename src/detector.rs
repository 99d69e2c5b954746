//! External hand-landmark detector seam.
//!
//! Image decoding and hand pose detection are not implemented by this crate; they are supplied
//! by an external detector (MediaPipe's hand landmarker in the reference deployment). The
//! training pipeline only depends on the [`HandLandmarker`] trait, so any detector, or a test
//! stub, can be plugged in.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::landmark::{Landmarks, NUM_LANDMARKS};

/// A detector that finds hands in a single image.
pub trait HandLandmarker {
    /// Runs hand detection on the image at `path`.
    ///
    /// Returns one [`Landmarks`] set per detected hand, most prominent hand first. Zero
    /// detections is a normal outcome, not an error.
    fn detect(&mut self, path: &Path) -> Result<Vec<Landmarks>>;
}

#[derive(Debug, Deserialize)]
struct SidecarPoint {
    x: f32,
    y: f32,
    z: f32,
}

/// Reads detector output from JSON sidecar files written by an external detection tool.
///
/// For an image `foo.jpg`, the sidecar is `foo.landmarks.json`: an array of hands, each an
/// array of exactly 21 `{x, y, z}` objects. A missing sidecar means the detector found no hand
/// in that image.
pub struct SidecarLandmarks;

/// File extension of the sidecar files, replacing the image extension.
pub const SIDECAR_EXTENSION: &str = "landmarks.json";

impl HandLandmarker for SidecarLandmarks {
    fn detect(&mut self, path: &Path) -> Result<Vec<Landmarks>> {
        let sidecar = path.with_extension(SIDECAR_EXTENSION);
        if !sidecar.exists() {
            return Ok(Vec::new());
        }

        let json = std::fs::read_to_string(&sidecar)?;
        let hands: Vec<Vec<SidecarPoint>> = serde_json::from_str(&json)?;
        hands
            .into_iter()
            .map(|points| {
                if points.len() != NUM_LANDMARKS {
                    return Err(Error::Validation(format!(
                        "sidecar {} contains a hand with {} landmarks, expected {}",
                        sidecar.display(),
                        points.len(),
                        NUM_LANDMARKS,
                    )));
                }
                let coords = points
                    .iter()
                    .map(|p| [p.x, p.y, p.z])
                    .collect::<Vec<_>>();
                Ok(Landmarks::from_coords(&coords).unwrap())
            })
            .collect()
    }
}
