//! Model training: stratified splitting, ensemble fitting, and evaluation.
//!
//! [`train`] is an explicit pipeline of pure stages (split → fit → evaluate) that returns a
//! structured [`TrainReport`] instead of printing its way through; the caller decides what to
//! persist and the evaluation numbers are only ever logged, never stored in the artifact.

use crate::dataset::{Dataset, CLASS_LABELS};
use crate::error::{Error, Result};
use crate::forest::{ForestConfig, RandomForest};

/// Minimum number of extracted samples required before fitting is attempted.
pub const MIN_TOTAL_SAMPLES: usize = 100;

/// Training parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainOptions {
    pub forest: ForestConfig,
    /// Fraction of each class held out for evaluation.
    pub test_fraction: f32,
}

impl TrainOptions {
    pub const DEFAULT_TEST_FRACTION: f32 = 0.2;
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            forest: ForestConfig::default(),
            test_fraction: Self::DEFAULT_TEST_FRACTION,
        }
    }
}

/// Sample indices of a train/test partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Partitions sample indices into stratified train and test sets.
///
/// Each class contributes `test_fraction` of its samples (rounded down, but at least one when
/// the class has two or more) to the test set, so per-class proportions survive the split.
/// The shuffle is seeded: same labels and seed, same partition.
pub fn stratified_split(labels: &[usize], test_fraction: f32, seed: u64) -> Split {
    let mut rng = fastrand::Rng::with_seed(seed);
    let num_classes = labels.iter().copied().max().map_or(0, |m| m + 1);

    let mut by_class = vec![Vec::new(); num_classes];
    for (i, &label) in labels.iter().enumerate() {
        by_class[label].push(i);
    }

    let mut split = Split {
        train: Vec::new(),
        test: Vec::new(),
    };
    for indices in &mut by_class {
        rng.shuffle(indices);
        let mut test_len = (indices.len() as f32 * test_fraction) as usize;
        if test_len == 0 && indices.len() >= 2 {
            test_len = 1;
        }
        split.test.extend(&indices[..test_len]);
        split.train.extend(&indices[test_len..]);
    }
    split
}

/// Precision/recall/F1 of a single class on the held-out split.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f32,
    pub recall: f32,
    pub f1: f32,
    /// Number of held-out samples of this class.
    pub support: usize,
}

/// Evaluation results on the held-out split.
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub accuracy: f32,
    pub per_class: Vec<ClassMetrics>,
}

/// Evaluates `forest` on the samples selected by `test`.
pub fn evaluate(forest: &RandomForest, dataset: &Dataset, test: &[usize]) -> Metrics {
    let num_classes = forest.num_classes();
    let mut confusion = vec![vec![0usize; num_classes]; num_classes];
    for &i in test {
        let predicted = forest.predict(&dataset.features[i]);
        confusion[dataset.labels[i]][predicted] += 1;
    }

    let correct: usize = (0..num_classes).map(|c| confusion[c][c]).sum();
    let accuracy = correct as f32 / test.len().max(1) as f32;

    let per_class = (0..num_classes)
        .map(|c| {
            let tp = confusion[c][c];
            let support: usize = confusion[c].iter().sum();
            let predicted: usize = (0..num_classes).map(|t| confusion[t][c]).sum();
            let precision = ratio(tp, predicted);
            let recall = ratio(tp, support);
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };
            ClassMetrics {
                label: CLASS_LABELS.get(c).copied().unwrap_or("?").to_string(),
                precision,
                recall,
                f1,
                support,
            }
        })
        .collect();

    Metrics {
        accuracy,
        per_class,
    }
}

fn ratio(numerator: usize, denominator: usize) -> f32 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f32 / denominator as f32
    }
}

/// The outcome of a training run.
#[derive(Debug)]
pub struct TrainReport {
    pub forest: RandomForest,
    pub train_size: usize,
    pub test_size: usize,
    pub metrics: Metrics,
}

/// Runs the training pipeline: split, fit, evaluate.
///
/// Fails with [`Error::InsufficientData`] when the extraction pipeline yielded fewer than
/// [`MIN_TOTAL_SAMPLES`] samples; this is a fatal precondition, not something to recover from.
pub fn train(dataset: &Dataset, options: &TrainOptions) -> Result<TrainReport> {
    if dataset.len() < MIN_TOTAL_SAMPLES {
        return Err(Error::InsufficientData {
            got: dataset.len(),
            required: MIN_TOTAL_SAMPLES,
        });
    }

    let split = stratified_split(&dataset.labels, options.test_fraction, options.forest.seed);
    log::info!(
        "training set: {} samples, test set: {} samples",
        split.train.len(),
        split.test.len(),
    );

    let train_features: Vec<_> = split.train.iter().map(|&i| dataset.features[i]).collect();
    let train_labels: Vec<_> = split.train.iter().map(|&i| dataset.labels[i]).collect();
    let forest = RandomForest::fit(
        &train_features,
        &train_labels,
        CLASS_LABELS.len(),
        &options.forest,
    );

    let metrics = evaluate(&forest, dataset, &split.test);
    log::info!("test accuracy: {:.2}%", metrics.accuracy * 100.0);
    for class in &metrics.per_class {
        if class.support == 0 {
            continue;
        }
        log::info!(
            "  {}: precision {:.3}, recall {:.3}, f1 {:.3} ({} samples)",
            class.label,
            class.precision,
            class.recall,
            class.f1,
            class.support,
        );
    }

    Ok(TrainReport {
        train_size: split.train.len(),
        test_size: split.test.len(),
        forest,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use crate::feature::FEATURE_DIM;

    use super::*;

    fn labeled_dataset(per_class: &[usize]) -> Dataset {
        let mut dataset = Dataset::default();
        for (label, &count) in per_class.iter().enumerate() {
            for i in 0..count {
                let v = label as f32 + (i as f32 * 0.31).sin() * 0.1;
                dataset.push([v; FEATURE_DIM], label);
            }
        }
        dataset
    }

    #[test]
    fn split_preserves_class_proportions() {
        let dataset = labeled_dataset(&[50, 100, 10]);
        let split = stratified_split(&dataset.labels, 0.2, 42);

        assert_eq!(split.test.len(), 10 + 20 + 2);
        assert_eq!(split.train.len(), 40 + 80 + 8);

        let test_of_class =
            |c: usize| split.test.iter().filter(|&&i| dataset.labels[i] == c).count();
        assert_eq!(test_of_class(0), 10);
        assert_eq!(test_of_class(1), 20);
        assert_eq!(test_of_class(2), 2);
    }

    #[test]
    fn split_is_deterministic_for_a_seed() {
        let dataset = labeled_dataset(&[30, 30]);
        let a = stratified_split(&dataset.labels, 0.2, 42);
        let b = stratified_split(&dataset.labels, 0.2, 42);
        assert_eq!(a, b);

        let c = stratified_split(&dataset.labels, 0.2, 7);
        assert_ne!(a, c);
    }

    #[test]
    fn tiny_classes_keep_a_test_sample() {
        let split = stratified_split(&[0, 0, 1], 0.2, 42);
        // Class 0 has 2 samples: despite 0.2 * 2 rounding down to 0, one goes to test.
        // Class 1 has a single sample, which stays in training.
        assert_eq!(split.test.len(), 1);
        assert_eq!(split.train.len(), 2);
        assert!(split.train.contains(&2));
    }

    #[test]
    fn rejects_insufficient_data() {
        let dataset = labeled_dataset(&[30, 30]);
        let err = train(&dataset, &TrainOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientData { got: 60, required: MIN_TOTAL_SAMPLES }
        ));
    }

    #[test]
    fn trains_and_reports_metrics() {
        let dataset = labeled_dataset(&[60, 60]);
        let options = TrainOptions {
            forest: ForestConfig {
                trees: 15,
                ..ForestConfig::default()
            },
            ..TrainOptions::default()
        };
        let report = train(&dataset, &options).unwrap();

        assert_eq!(report.train_size, 96);
        assert_eq!(report.test_size, 24);
        // The two classes are trivially separable.
        assert!(report.metrics.accuracy > 0.95);
        assert_eq!(report.metrics.per_class.len(), CLASS_LABELS.len());
        assert_eq!(report.metrics.per_class[0].label, "A");
        assert!(report.metrics.per_class[0].support > 0);
    }
}
