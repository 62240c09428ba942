use crate::types::{round4, Counts, MetricsRecord};

/// Per-pair confusion outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    TruePositive,
    FalsePositive,
    FalseNegative,
    TrueNegative,
}

impl Outcome {
    /// `true` when prediction equals ground truth.
    pub fn is_correct(&self) -> bool {
        matches!(self, Outcome::TruePositive | Outcome::TrueNegative)
    }
}

/// Classify one (prediction, truth) pair.
///
/// Both inputs must already be binary; callers apply [`crate::remap_label`]
/// to human labels before reaching this point.
pub fn classify_outcome(prediction: u8, truth: u8) -> Outcome {
    match (truth == 1, prediction == 1) {
        (true, true) => Outcome::TruePositive,
        (false, true) => Outcome::FalsePositive,
        (true, false) => Outcome::FalseNegative,
        (false, false) => Outcome::TrueNegative,
    }
}

/// Compute a [`MetricsRecord`] from aligned (prediction, truth) pairs.
///
/// `denominator` overrides the reported `total` when some pairs were
/// excluded from scoring but the evaluation is reported against the full
/// candidate-pool size. Precision, recall, F1 and agreement all degrade to
/// `0.0` on empty denominators.
pub fn compute_metrics(pairs: &[(u8, u8)], denominator: Option<usize>) -> MetricsRecord {
    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut fn_ = 0usize;
    let mut tn = 0usize;

    for &(prediction, truth) in pairs {
        debug_assert!(prediction <= 1 && truth <= 1, "inputs must be binary");
        match classify_outcome(prediction, truth) {
            Outcome::TruePositive => tp += 1,
            Outcome::FalsePositive => fp += 1,
            Outcome::FalseNegative => fn_ += 1,
            Outcome::TrueNegative => tn += 1,
        }
    }

    let total = denominator.unwrap_or(pairs.len());

    let agreement = if total > 0 {
        (tp + tn) as f64 / total as f64
    } else {
        0.0
    };
    let precision = if tp + fp > 0 {
        tp as f64 / (tp + fp) as f64
    } else {
        0.0
    };
    let recall = if tp + fn_ > 0 {
        tp as f64 / (tp + fn_) as f64
    } else {
        0.0
    };
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };
    let coverage = if total > 0 {
        (tp + fp) as f64 / total as f64
    } else {
        0.0
    };

    MetricsRecord {
        agreement: round4(agreement),
        precision: round4(precision),
        recall: round4(recall),
        f1: round4(f1),
        coverage: round4(coverage),
        counts: Counts {
            tp,
            fp,
            r#fn: fn_,
            tn,
            total,
        },
    }
}
