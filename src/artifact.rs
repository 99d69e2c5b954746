//! Persisted model artifact: the hand-off boundary between training and serving.
//!
//! An artifact directory contains two files: the fitted forest (`model.json`) and a metadata
//! document (`metadata.json`) carrying the ordered class-label table, the feature
//! dimensionality, the class count, and the number of samples the model was trained on. The
//! label table is stored in exactly the order used to assign class indices during extraction,
//! so `class_labels[i]` is always the letter for class index `i`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::feature::FEATURE_DIM;
use crate::forest::RandomForest;

pub const MODEL_FILE: &str = "model.json";
pub const METADATA_FILE: &str = "metadata.json";

/// Self-description of a persisted model, validated at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub class_labels: Vec<String>,
    pub num_features: usize,
    pub num_classes: usize,
    pub total_samples: usize,
}

/// A fitted classifier plus its metadata. Immutable once loaded.
#[derive(Debug)]
pub struct ModelArtifact {
    forest: RandomForest,
    metadata: Metadata,
}

impl ModelArtifact {
    /// Bundles a fitted forest with consistent metadata.
    ///
    /// `class_labels` must be the label table whose indices were used while building the
    /// training set; `total_samples` is the extracted sample count, kept for diagnostics.
    pub fn new(forest: RandomForest, class_labels: Vec<String>, total_samples: usize) -> Self {
        let metadata = Metadata {
            num_features: forest.num_features(),
            num_classes: class_labels.len(),
            class_labels,
            total_samples,
        };
        Self { forest, metadata }
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Returns the letter for a class index, if the index is known.
    pub fn label(&self, class: usize) -> Option<&str> {
        self.metadata.class_labels.get(class).map(String::as_str)
    }

    /// Writes `model.json` and `metadata.json` into `dir`, creating it if needed.
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        std::fs::write(
            dir.join(MODEL_FILE),
            serde_json::to_vec(&self.forest)?,
        )?;
        std::fs::write(
            dir.join(METADATA_FILE),
            serde_json::to_vec_pretty(&self.metadata)?,
        )?;
        Ok(())
    }

    /// Loads and validates an artifact directory.
    ///
    /// Any failure (missing file, corrupt JSON, metadata that does not match the model or this
    /// crate's feature dimensionality) comes back as [`Error::StartupLoad`].
    pub fn load(dir: &Path) -> Result<Self> {
        let read = |file: &str| -> Result<Vec<u8>> {
            std::fs::read(dir.join(file)).map_err(|e| {
                Error::StartupLoad(format!("{}: {e}", dir.join(file).display()))
            })
        };

        let forest: RandomForest = serde_json::from_slice(&read(MODEL_FILE)?)
            .map_err(|e| Error::StartupLoad(format!("{MODEL_FILE}: {e}")))?;
        let metadata: Metadata = serde_json::from_slice(&read(METADATA_FILE)?)
            .map_err(|e| Error::StartupLoad(format!("{METADATA_FILE}: {e}")))?;

        if metadata.num_features != FEATURE_DIM {
            return Err(Error::StartupLoad(format!(
                "metadata declares {} features, the normalizer produces {FEATURE_DIM}",
                metadata.num_features,
            )));
        }
        if metadata.num_classes != metadata.class_labels.len() {
            return Err(Error::StartupLoad(format!(
                "metadata declares {} classes but lists {} labels",
                metadata.num_classes,
                metadata.class_labels.len(),
            )));
        }
        if forest.num_classes() != metadata.num_classes {
            return Err(Error::StartupLoad(format!(
                "model distinguishes {} classes, metadata declares {}",
                forest.num_classes(),
                metadata.num_classes,
            )));
        }

        Ok(Self { forest, metadata })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use crate::dataset::CLASS_LABELS;
    use crate::forest::ForestConfig;

    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "fingerspell-artifact-{tag}-{}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn fitted_artifact() -> ModelArtifact {
        let features: Vec<[f32; FEATURE_DIM]> = (0..48)
            .map(|i| [(i % 24) as f32 / 24.0; FEATURE_DIM])
            .collect();
        let labels: Vec<usize> = (0..48).map(|i| i % 24).collect();
        let config = ForestConfig {
            trees: 5,
            ..ForestConfig::default()
        };
        let forest = RandomForest::fit(&features, &labels, CLASS_LABELS.len(), &config);
        ModelArtifact::new(
            forest,
            CLASS_LABELS.iter().map(|s| s.to_string()).collect(),
            48,
        )
    }

    #[test]
    fn save_load_round_trip() {
        let dir = temp_dir("round-trip");
        let artifact = fitted_artifact();
        artifact.save(&dir).unwrap();

        let loaded = ModelArtifact::load(&dir).unwrap();
        assert_eq!(loaded.metadata(), artifact.metadata());
        assert_eq!(loaded.label(0), Some("A"));
        assert_eq!(loaded.label(23), Some("Y"));
        assert_eq!(loaded.label(24), None);

        let input = [0.25; FEATURE_DIM];
        assert_eq!(
            loaded.forest().predict_proba(&input),
            artifact.forest().predict_proba(&input)
        );
    }

    #[test]
    fn missing_directory_is_a_startup_error() {
        let err = ModelArtifact::load(Path::new("/nonexistent/model")).unwrap_err();
        assert!(matches!(err, Error::StartupLoad(_)));
    }

    #[test]
    fn rejects_feature_dim_mismatch() {
        let dir = temp_dir("feature-dim");
        let artifact = fitted_artifact();
        artifact.save(&dir).unwrap();

        let mut metadata = artifact.metadata().clone();
        metadata.num_features = 42;
        fs::write(
            dir.join(METADATA_FILE),
            serde_json::to_vec(&metadata).unwrap(),
        )
        .unwrap();

        assert!(matches!(
            ModelArtifact::load(&dir),
            Err(Error::StartupLoad(_))
        ));
    }

    #[test]
    fn rejects_label_count_mismatch() {
        let dir = temp_dir("label-count");
        let artifact = fitted_artifact();
        artifact.save(&dir).unwrap();

        let mut metadata = artifact.metadata().clone();
        metadata.class_labels.pop();
        fs::write(
            dir.join(METADATA_FILE),
            serde_json::to_vec(&metadata).unwrap(),
        )
        .unwrap();

        assert!(matches!(
            ModelArtifact::load(&dir),
            Err(Error::StartupLoad(_))
        ));
    }

    #[test]
    fn rejects_corrupt_model_blob() {
        let dir = temp_dir("corrupt");
        let artifact = fitted_artifact();
        artifact.save(&dir).unwrap();
        fs::write(dir.join(MODEL_FILE), b"not json").unwrap();

        assert!(matches!(
            ModelArtifact::load(&dir),
            Err(Error::StartupLoad(_))
        ));
    }
}
