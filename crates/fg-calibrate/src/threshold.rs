use std::collections::BTreeMap;

use fg_dataset::{AlignedPair, QueryClass};
use fg_metrics::{compute_metrics, round4, MetricsRecord};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Gated prediction
// ---------------------------------------------------------------------------

/// Confidence-gated decision rule: 1 iff the judge matched AND confidence
/// clears the threshold. Raising `t` can only flip predictions 1 -> 0.
pub fn predict_gated(ai_match: u8, confidence: f64, threshold: f64) -> u8 {
    if ai_match == 1 && confidence >= threshold {
        1
    } else {
        0
    }
}

// ---------------------------------------------------------------------------
// Sweep + fit
// ---------------------------------------------------------------------------

/// Metrics at one candidate threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub threshold: f64,
    pub metrics: MetricsRecord,
}

/// The selected threshold and the metrics it achieved on the fit set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdFit {
    pub threshold: f64,
    pub metrics: MetricsRecord,
}

/// Evaluate every candidate threshold over `pairs`, in scan order.
pub fn sweep(
    pairs: &[AlignedPair],
    candidates: &[f64],
    denominator: Option<usize>,
) -> Vec<SweepPoint> {
    candidates
        .iter()
        .map(|&t| {
            let preds: Vec<(u8, u8)> = pairs
                .iter()
                .map(|p| (predict_gated(p.ai_match, p.confidence, t), p.truth))
                .collect();
            SweepPoint {
                threshold: t,
                metrics: compute_metrics(&preds, denominator),
            }
        })
        .collect()
}

/// Select the agreement-maximizing threshold from `candidates`.
///
/// Strict-greater comparison during the scan, so equal-agreement ties keep
/// the earliest (lowest) candidate. Returns `None` only for an empty grid.
pub fn fit_threshold(
    pairs: &[AlignedPair],
    candidates: &[f64],
    denominator: Option<usize>,
) -> Option<ThresholdFit> {
    let mut best: Option<ThresholdFit> = None;
    for point in sweep(pairs, candidates, denominator) {
        let better = match &best {
            None => true,
            Some(b) => point.metrics.agreement > b.metrics.agreement,
        };
        if better {
            best = Some(ThresholdFit {
                threshold: point.threshold,
                metrics: point.metrics,
            });
        }
    }
    best
}

/// Fit one threshold per query class, each on its own pair subset.
///
/// Classes with no pairs in `pairs` get no entry; callers fall back to a
/// configured default when applying.
pub fn fit_thresholds_by_class(
    pairs: &[AlignedPair],
    candidates: &[f64],
) -> BTreeMap<QueryClass, ThresholdFit> {
    let mut out = BTreeMap::new();
    for class in [QueryClass::Technical, QueryClass::Subjective] {
        let subset: Vec<AlignedPair> = pairs.iter().filter(|p| p.class == class).cloned().collect();
        if subset.is_empty() {
            continue;
        }
        if let Some(fit) = fit_threshold(&subset, candidates, None) {
            out.insert(class, fit);
        }
    }
    out
}

/// Apply per-class thresholds to `pairs`, producing (prediction, truth)
/// rows. A pair whose class has no fitted threshold uses `default_threshold`.
pub fn apply_grouped(
    pairs: &[AlignedPair],
    thresholds: &BTreeMap<QueryClass, f64>,
    default_threshold: f64,
) -> Vec<(u8, u8)> {
    pairs
        .iter()
        .map(|p| {
            let t = thresholds.get(&p.class).copied().unwrap_or(default_threshold);
            (predict_gated(p.ai_match, p.confidence, t), p.truth)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Calibration curve
// ---------------------------------------------------------------------------

/// Observed accuracy at one reported confidence level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationBin {
    pub confidence: f64,
    pub accuracy: f64,
    pub count: usize,
}

/// Observed accuracy per confidence value over positive judge predictions.
///
/// Judges report confidence on a coarse scale, so bins match on value
/// (within float tolerance) rather than on ranges. Empty bins are omitted.
pub fn calibration_curve(pairs: &[AlignedPair], bins: &[f64]) -> Vec<CalibrationBin> {
    let mut out = Vec::new();
    for &b in bins {
        let in_bin: Vec<&AlignedPair> = pairs
            .iter()
            .filter(|p| p.ai_match == 1 && (p.confidence - b).abs() < 1e-9)
            .collect();
        if in_bin.is_empty() {
            continue;
        }
        let correct = in_bin.iter().filter(|p| p.truth == 1).count();
        out.push(CalibrationBin {
            confidence: b,
            accuracy: round4(correct as f64 / in_bin.len() as f64),
            count: in_bin.len(),
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use fg_dataset::PairKey;

    fn pair(q: &str, f: &str, ai: u8, conf: f64, truth: u8, class: QueryClass) -> AlignedPair {
        AlignedPair {
            key: PairKey::new(q, f),
            truth,
            ai_match: ai,
            confidence: conf,
            class,
        }
    }

    /// True positives confident at >= 0.85, false positives below: the sweep
    /// must land on the first candidate at or above 0.85.
    #[test]
    fn sweep_selects_separating_threshold() {
        let pairs = vec![
            pair("q1", "A", 1, 0.9, 1, QueryClass::Technical),
            pair("q1", "B", 1, 0.85, 1, QueryClass::Technical),
            pair("q2", "C", 1, 0.82, 0, QueryClass::Technical),
            pair("q2", "D", 1, 0.80, 0, QueryClass::Technical),
            pair("q3", "E", 0, 0.9, 0, QueryClass::Technical),
        ];
        let candidates = vec![0.5, 0.6, 0.7, 0.8, 0.85, 0.9];
        let fit = fit_threshold(&pairs, &candidates, None).unwrap();
        assert_eq!(fit.threshold, 0.85);
        assert_eq!(fit.metrics.agreement, 1.0);
    }

    #[test]
    fn ties_keep_the_lowest_candidate() {
        // Every threshold below all confidences is equivalent.
        let pairs = vec![
            pair("q1", "A", 1, 0.95, 1, QueryClass::Subjective),
            pair("q1", "B", 0, 0.95, 0, QueryClass::Subjective),
        ];
        let fit = fit_threshold(&pairs, &[0.1, 0.2, 0.3], None).unwrap();
        assert_eq!(fit.threshold, 0.1);
    }

    /// Raising the threshold only moves predictions 1 -> 0, so recall is
    /// non-increasing; with every true positive reported above every false
    /// positive, precision is also weakly non-decreasing along the grid.
    #[test]
    fn sweep_is_monotonic_safe() {
        let pairs = vec![
            pair("q1", "A", 1, 0.95, 1, QueryClass::Technical),
            pair("q1", "B", 1, 0.85, 1, QueryClass::Technical),
            pair("q2", "D", 1, 0.80, 1, QueryClass::Technical),
            pair("q1", "C", 1, 0.60, 0, QueryClass::Technical),
            pair("q2", "E", 1, 0.30, 0, QueryClass::Technical),
            pair("q2", "F", 0, 0.99, 0, QueryClass::Technical),
            pair("q3", "G", 1, 0.10, 0, QueryClass::Technical),
        ];
        let grid: Vec<f64> = (0..=20).map(|i| i as f64 / 20.0).collect();
        let points = sweep(&pairs, &grid, None);
        for w in points.windows(2) {
            assert!(
                w[1].metrics.recall <= w[0].metrics.recall + 1e-9,
                "recall increased between t={} and t={}",
                w[0].threshold,
                w[1].threshold
            );
            // Precision may only drop to the degenerate 0.0 when no positive
            // predictions remain.
            if w[1].metrics.counts.tp + w[1].metrics.counts.fp > 0 {
                assert!(
                    w[1].metrics.precision >= w[0].metrics.precision - 1e-9,
                    "precision decreased between t={} and t={}",
                    w[0].threshold,
                    w[1].threshold
                );
            }
        }
    }

    #[test]
    fn per_class_fit_diverges_between_groups() {
        // Technical queries: high confidence separates cleanly at 0.9.
        // Subjective queries: everything useful sits at low confidence.
        let pairs = vec![
            pair("t1", "A", 1, 0.9, 1, QueryClass::Technical),
            pair("t1", "B", 1, 0.5, 0, QueryClass::Technical),
            pair("s1", "C", 1, 0.3, 1, QueryClass::Subjective),
            pair("s1", "D", 0, 0.9, 0, QueryClass::Subjective),
        ];
        let candidates = vec![0.0, 0.3, 0.6, 0.9];
        let fits = fit_thresholds_by_class(&pairs, &candidates);
        assert_eq!(fits[&QueryClass::Technical].threshold, 0.6);
        assert_eq!(fits[&QueryClass::Subjective].threshold, 0.0);
    }

    #[test]
    fn apply_grouped_falls_back_to_default() {
        let pairs = vec![pair("s1", "A", 1, 0.85, 1, QueryClass::Subjective)];
        let mut thresholds = BTreeMap::new();
        thresholds.insert(QueryClass::Technical, 0.5);
        // Subjective missing: default 0.9 gates the 0.85-confidence match off.
        let preds = apply_grouped(&pairs, &thresholds, 0.9);
        assert_eq!(preds, vec![(0, 1)]);
    }

    #[test]
    fn calibration_curve_reports_accuracy_per_bin() {
        let pairs = vec![
            pair("q1", "A", 1, 0.9, 1, QueryClass::Technical),
            pair("q1", "B", 1, 0.9, 0, QueryClass::Technical),
            pair("q1", "C", 1, 0.95, 1, QueryClass::Technical),
            pair("q1", "D", 0, 0.8, 0, QueryClass::Technical), // negative verdict: excluded
        ];
        let curve = calibration_curve(&pairs, &[0.8, 0.9, 0.95]);
        assert_eq!(curve.len(), 2);
        assert_eq!(curve[0].confidence, 0.9);
        assert_eq!(curve[0].accuracy, 0.5);
        assert_eq!(curve[0].count, 2);
        assert_eq!(curve[1].accuracy, 1.0);
    }
}
