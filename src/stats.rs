use std::fmt;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::format::G;

/// Running sums over `(predicted, target)` pairs.
///
/// Updating is O(1) and nothing per-sample is kept. [`RunningStats::finalize`]
/// consumes the accumulator, so no update can follow it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunningStats {
    count: usize,
    correct_count: usize,
    squared_error_sum: f64,
    sum_pred: f64,
    sum_target: f64,
    sum_pred_sq: f64,
    sum_target_sq: f64,
    sum_pred_target: f64,
    // First values seen and whether every later value matched them. Zero
    // variance is decided from these, not from the rounded sums.
    first_pred: f64,
    first_target: f64,
    constant_pred: bool,
    constant_target: bool,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, predicted: f64, target: f64) {
        self.count += 1;
        if self.count == 1 {
            self.first_pred = predicted;
            self.first_target = target;
            self.constant_pred = true;
            self.constant_target = true;
        } else {
            self.constant_pred &= predicted == self.first_pred;
            self.constant_target &= target == self.first_target;
        }
        // Exact comparison: only meaningful for integral class labels.
        if predicted == target {
            self.correct_count += 1;
        }
        self.squared_error_sum += (predicted - target) * (predicted - target);
        self.sum_pred += predicted;
        self.sum_target += target;
        self.sum_pred_sq += predicted * predicted;
        self.sum_target_sq += target * target;
        self.sum_pred_target += predicted * target;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn finalize(self) -> Metrics {
        if self.count == 0 {
            warn!("no samples were evaluated; all metrics are undefined");
            return Metrics {
                total: 0,
                correct: 0,
                accuracy: f64::NAN,
                mean_squared_error: f64::NAN,
                squared_correlation: f64::NAN,
            };
        }

        let n = self.count as f64;
        let cov = n * self.sum_pred_target - self.sum_pred * self.sum_target;
        let var_pred = n * self.sum_pred_sq - self.sum_pred * self.sum_pred;
        let var_target = n * self.sum_target_sq - self.sum_target * self.sum_target;
        let denom = var_pred * var_target;
        let squared_correlation = if self.constant_pred || self.constant_target || denom == 0.0 {
            debug!(
                var_pred,
                var_target, "constant predictions or targets; squared correlation is undefined"
            );
            f64::NAN
        } else {
            cov * cov / denom
        };

        Metrics {
            total: self.count,
            correct: self.correct_count,
            accuracy: self.correct_count as f64 / n * 100.0,
            mean_squared_error: self.squared_error_sum / n,
            squared_correlation,
        }
    }
}

/// Final figures of an evaluation run.
///
/// All three metrics are always present; which one matters depends on
/// whether the model is a classifier or a regressor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Metrics {
    pub total: usize,
    pub correct: usize,
    /// Percentage of exact matches. NaN when `total == 0`.
    pub accuracy: f64,
    /// NaN when `total == 0`.
    pub mean_squared_error: f64,
    /// NaN when `total == 0` or when either the predictions or the targets
    /// have zero variance (a single sample, or all values identical).
    pub squared_correlation: f64,
}

impl Metrics {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Accuracy = {}% ({}/{}) (classification)",
            G(self.accuracy),
            self.correct,
            self.total
        )?;
        writeln!(f, "Mean squared error = {} (regression)", G(self.mean_squared_error))?;
        writeln!(
            f,
            "Squared correlation coefficient = {} (regression)",
            G(self.squared_correlation)
        )
    }
}

/// Computes the metrics of already collected targets and predictions.
pub fn evaluations(targets: &[f64], predictions: &[f64]) -> Result<Metrics> {
    if targets.len() != predictions.len() {
        return Err(Error::LengthMismatch {
            targets: targets.len(),
            predictions: predictions.len(),
        });
    }
    let mut stats = RunningStats::new();
    for (&y, &v) in targets.iter().zip(predictions) {
        stats.update(v, y);
    }
    Ok(stats.finalize())
}
