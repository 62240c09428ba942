use std::collections::{BTreeMap, BTreeSet};

use fg_dataset::{AlignedPair, QueryClass};
use fg_metrics::{compute_metrics, round4, MetricsRecord};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::threshold::{fit_thresholds_by_class, predict_gated};

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Held-out result for one fold.
///
/// Counts are fold-local diagnostics; they are never summed across folds
/// because fold denominators differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldReport {
    pub fold: usize,
    pub test_queries: Vec<String>,
    /// Threshold fit on the training queries, per class.
    pub thresholds: BTreeMap<QueryClass, f64>,
    pub metrics: MetricsRecord,
}

/// Arithmetic mean of the scalar metrics across folds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeanMetrics {
    pub agreement: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Aggregated cross-validation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossValReport {
    /// The k that was requested.
    pub k_folds: usize,
    /// The k actually used: requested k clamped to the distinct query count,
    /// so no fold is ever empty.
    pub effective_k_folds: usize,
    pub seed: u64,
    pub mean: MeanMetrics,
    pub folds: Vec<FoldReport>,
}

// ---------------------------------------------------------------------------
// K-fold by query
// ---------------------------------------------------------------------------

/// Query-level k-fold cross-validation of per-class threshold calibration.
///
/// Distinct query ids are shuffled with a seeded RNG and split into `k`
/// near-equal folds. Per fold, thresholds are fit on the training queries'
/// pairs only and applied to the held-out pairs; a held-out class that was
/// never fit falls back to `default_threshold`. `k_folds` is clamped to the
/// distinct query count so empty folds never enter the mean. Degenerate
/// folds (no positives or no negatives) report zeroed precision/recall per
/// the metrics contract and do not error.
pub fn cross_validate(
    pairs: &[AlignedPair],
    k_folds: usize,
    seed: u64,
    candidates: &[f64],
    default_threshold: f64,
) -> CrossValReport {
    let mut query_ids: Vec<String> = pairs
        .iter()
        .map(|p| p.key.query_id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut rng = StdRng::seed_from_u64(seed);
    query_ids.shuffle(&mut rng);

    let effective_k = k_folds.min(query_ids.len());
    let folds = split_near_equal(&query_ids, effective_k);

    let mut fold_reports = Vec::with_capacity(folds.len());
    for (i, test_queries) in folds.iter().enumerate() {
        let test_set: BTreeSet<&str> = test_queries.iter().map(|s| s.as_str()).collect();

        let train_pairs: Vec<AlignedPair> = pairs
            .iter()
            .filter(|p| !test_set.contains(p.key.query_id.as_str()))
            .cloned()
            .collect();
        let fits = fit_thresholds_by_class(&train_pairs, candidates);
        let thresholds: BTreeMap<QueryClass, f64> =
            fits.iter().map(|(c, f)| (*c, f.threshold)).collect();

        let held_out: Vec<(u8, u8)> = pairs
            .iter()
            .filter(|p| test_set.contains(p.key.query_id.as_str()))
            .map(|p| {
                let t = thresholds
                    .get(&p.class)
                    .copied()
                    .unwrap_or(default_threshold);
                (predict_gated(p.ai_match, p.confidence, t), p.truth)
            })
            .collect();

        let mut sorted_queries = test_queries.clone();
        sorted_queries.sort();
        fold_reports.push(FoldReport {
            fold: i,
            test_queries: sorted_queries,
            thresholds,
            metrics: compute_metrics(&held_out, None),
        });
    }

    let mean = mean_of(&fold_reports);
    CrossValReport {
        k_folds,
        effective_k_folds: effective_k,
        seed,
        mean,
        folds: fold_reports,
    }
}

/// Split ids into `k` chunks whose sizes differ by at most one, leading
/// chunks larger.
fn split_near_equal(ids: &[String], k: usize) -> Vec<Vec<String>> {
    if k == 0 {
        return Vec::new();
    }
    let base = ids.len() / k;
    let remainder = ids.len() % k;
    let mut folds = Vec::with_capacity(k);
    let mut cursor = 0usize;
    for i in 0..k {
        let size = base + usize::from(i < remainder);
        folds.push(ids[cursor..cursor + size].to_vec());
        cursor += size;
    }
    folds
}

fn mean_of(folds: &[FoldReport]) -> MeanMetrics {
    if folds.is_empty() {
        return MeanMetrics {
            agreement: 0.0,
            precision: 0.0,
            recall: 0.0,
            f1: 0.0,
        };
    }
    let n = folds.len() as f64;
    MeanMetrics {
        agreement: round4(folds.iter().map(|f| f.metrics.agreement).sum::<f64>() / n),
        precision: round4(folds.iter().map(|f| f.metrics.precision).sum::<f64>() / n),
        recall: round4(folds.iter().map(|f| f.metrics.recall).sum::<f64>() / n),
        f1: round4(folds.iter().map(|f| f.metrics.f1).sum::<f64>() / n),
    }
}
