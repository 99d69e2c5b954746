//! Offline training pipeline driver.
//!
//! Usage: `fingerspell [DATASET_DIR] [MODEL_DIR]`, with `FINGERSPELL_DATASET` and
//! `FINGERSPELL_MODEL_DIR` as fallbacks. The dataset directory must contain one subdirectory
//! per letter; landmark detection output is read from JSON sidecar files written by the
//! external detector (see [`fingerspell::detector`]).

use std::env;
use std::path::PathBuf;

use fingerspell::artifact::ModelArtifact;
use fingerspell::dataset::{self, CLASS_LABELS};
use fingerspell::detector::SidecarLandmarks;
use fingerspell::train::{self, TrainOptions};

fn main() -> anyhow::Result<()> {
    fingerspell::init_logger!();

    let mut args = env::args().skip(1);
    let dataset_dir = path_arg(args.next(), "FINGERSPELL_DATASET")
        .ok_or_else(|| anyhow::anyhow!("no dataset directory given"))?;
    let model_dir =
        path_arg(args.next(), "FINGERSPELL_MODEL_DIR").unwrap_or_else(|| PathBuf::from("model"));

    anyhow::ensure!(
        dataset_dir.is_dir(),
        "dataset directory {} does not exist",
        dataset_dir.display(),
    );

    log::info!("step 1: extracting landmark features from {}", dataset_dir.display());
    let mut detector = SidecarLandmarks;
    let dataset = dataset::extract(&dataset_dir, &mut detector)?;
    log::info!("total samples extracted: {}", dataset.len());

    log::info!("step 2: training random forest");
    let report = train::train(&dataset, &TrainOptions::default())?;

    log::info!("step 3: saving model artifact to {}", model_dir.display());
    let artifact = ModelArtifact::new(
        report.forest,
        CLASS_LABELS.iter().map(|s| s.to_string()).collect(),
        dataset.len(),
    );
    artifact.save(&model_dir)?;

    log::info!(
        "training complete: accuracy {:.2}% on {} held-out samples",
        report.metrics.accuracy * 100.0,
        report.test_size,
    );
    Ok(())
}

fn path_arg(arg: Option<String>, env_var: &str) -> Option<PathBuf> {
    arg.or_else(|| env::var(env_var).ok()).map(PathBuf::from)
}
