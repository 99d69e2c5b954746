//! Labeled feature extraction from an image corpus.
//!
//! The corpus is a directory with one subdirectory per letter. Each class directory is walked,
//! the external detector is run on every image (up to a per-class cap), and every detected hand
//! is normalized into a labeled feature vector. This is an offline batch job with no latency
//! contract; it only has to be deterministic for a given corpus and detector.

use std::path::Path;

use itertools::Itertools;

use crate::detector::HandLandmarker;
use crate::error::Result;
use crate::feature::{self, FEATURE_DIM};

/// The static alphabet letters, in class-index order.
///
/// J and Z are excluded: both require motion and cannot be classified from a single pose.
/// Class index `i` of the classifier always refers to `CLASS_LABELS[i]`; the extraction
/// pipeline and the persisted artifact both derive their label ordering from this table.
pub const CLASS_LABELS: [&str; 24] = [
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "K", "L", "M", "N", "O", "P", "Q", "R", "S",
    "T", "U", "V", "W", "X", "Y",
];

/// Upper bound on the images sampled per class.
pub const MAX_IMAGES_PER_CLASS: usize = 600;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Labeled feature vectors produced by [`extract`].
///
/// `features` and `labels` are parallel: `labels[i]` is the class index of `features[i]`.
#[derive(Debug, Default, Clone)]
pub struct Dataset {
    pub features: Vec<[f32; FEATURE_DIM]>,
    pub labels: Vec<usize>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn push(&mut self, features: [f32; FEATURE_DIM], label: usize) {
        self.features.push(features);
        self.labels.push(label);
    }

    /// Returns `(class index, sample count)` pairs in class-index order.
    pub fn class_counts(&self) -> Vec<(usize, usize)> {
        self.labels
            .iter()
            .counts()
            .into_iter()
            .map(|(&label, count)| (label, count))
            .sorted()
            .collect()
    }
}

/// Extracts normalized landmark features for every class in `root`.
///
/// Per-image failures (unreadable file, detector error, no hand found) are logged and skipped;
/// they never abort the run. A missing class directory is skipped with a warning, matching the
/// behavior of corpora that ship without some letters.
pub fn extract(root: &Path, detector: &mut dyn HandLandmarker) -> Result<Dataset> {
    let mut dataset = Dataset::default();

    for (label, letter) in CLASS_LABELS.iter().enumerate() {
        let class_dir = root.join(letter);
        if !class_dir.is_dir() {
            log::warn!("no directory for letter {letter}, skipping");
            continue;
        }

        let images = class_images(&class_dir)?;
        let attempted = images.len();
        let mut detected = 0;

        for image in &images {
            let hands = match detector.detect(image) {
                Ok(hands) => hands,
                Err(e) => {
                    log::debug!("skipping {}: {e}", image.display());
                    continue;
                }
            };
            // Use the most prominent hand when the detector reports more than one.
            let Some(hand) = hands.first() else { continue };
            dataset.push(feature::normalize(hand), label);
            detected += 1;
        }

        log::info!("{letter}: {detected}/{attempted} hands detected");
    }

    Ok(dataset)
}

/// Enumerates the class directory's image files, sorted by name, capped at
/// [`MAX_IMAGES_PER_CLASS`].
fn class_images(class_dir: &Path) -> Result<Vec<std::path::PathBuf>> {
    let mut images = Vec::new();
    for entry in std::fs::read_dir(class_dir)? {
        let path = entry?.path();
        let is_image = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                IMAGE_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            });
        if is_image {
            images.push(path);
        }
    }
    images.sort();
    images.truncate(MAX_IMAGES_PER_CLASS);
    Ok(images)
}
