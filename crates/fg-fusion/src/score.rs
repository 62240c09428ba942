use std::collections::{BTreeMap, BTreeSet};

use fg_dataset::{PairKey, QueryClass};
use fg_metrics::{compute_metrics, MetricsRecord};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::policy::FusionPolicy;
use crate::set::{FusionPair, FusionSet};

// ---------------------------------------------------------------------------
// Evaluation + leaderboard
// ---------------------------------------------------------------------------

/// Score one policy over the full pair set.
pub fn evaluate_policy(policy: &FusionPolicy, set: &FusionSet) -> MetricsRecord {
    score_pairs(policy, &set.pairs)
}

fn score_pairs(policy: &FusionPolicy, pairs: &[FusionPair]) -> MetricsRecord {
    let rows: Vec<(u8, u8)> = pairs
        .iter()
        .map(|p| (policy.decide(&p.signals, p.class), p.truth))
        .collect();
    compute_metrics(&rows, None)
}

/// One ranked leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub policy: FusionPolicy,
    pub metrics: MetricsRecord,
}

/// Score every candidate policy and rank by agreement, descending; equal
/// agreement breaks by name so the ordering is stable across runs.
pub fn leaderboard(
    policies: &[(String, FusionPolicy)],
    set: &FusionSet,
) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = policies
        .iter()
        .map(|(name, policy)| LeaderboardEntry {
            name: name.clone(),
            policy: policy.clone(),
            metrics: evaluate_policy(policy, set),
        })
        .collect();
    entries.sort_by(|a, b| {
        b.metrics
            .agreement
            .partial_cmp(&a.metrics.agreement)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    entries
}

// ---------------------------------------------------------------------------
// Weighted-linear fit
// ---------------------------------------------------------------------------

/// Search space for the weighted-linear grid fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedSearchSpace {
    /// Candidate weight values, tried per signal.
    pub weight_set: Vec<f64>,
    /// Candidate decision thresholds, low to high.
    pub thresholds: Vec<f64>,
    /// Queries sampled (without replacement) for the training split.
    pub train_query_count: usize,
}

/// Result of the weighted-linear grid search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedFit {
    pub policy: FusionPolicy,
    pub train_queries: Vec<String>,
    /// Agreement of the winning configuration on the training split.
    pub train_agreement: f64,
}

/// Exhaustive grid search for weighted-linear fusion parameters.
///
/// Weights and threshold are fit on a seeded train-query subset only; the
/// caller evaluates the returned policy on the full (or a disjoint test)
/// set. All-zero weight vectors are skipped. Ties keep the first
/// configuration in scan order (weights outer, thresholds inner), so the
/// fit is deterministic for a fixed seed.
pub fn fit_weighted(
    set: &FusionSet,
    signal_names: &[String],
    space: &WeightedSearchSpace,
    seed: u64,
) -> Option<WeightedFit> {
    if signal_names.is_empty() || space.weight_set.is_empty() || space.thresholds.is_empty() {
        return None;
    }

    let mut queries = set.query_ids();
    let mut rng = StdRng::seed_from_u64(seed);
    queries.shuffle(&mut rng);
    let train_count = space.train_query_count.min(queries.len());
    let train_set: BTreeSet<&str> = queries[..train_count].iter().map(|s| s.as_str()).collect();

    let train_pairs: Vec<FusionPair> = set
        .pairs
        .iter()
        .filter(|p| train_set.contains(p.key.query_id.as_str()))
        .cloned()
        .collect();

    let mut best: Option<(Vec<f64>, f64, f64)> = None;
    for weights in weight_grid(&space.weight_set, signal_names.len()) {
        if weights.iter().all(|&w| w == 0.0) {
            continue;
        }
        for &t in &space.thresholds {
            let candidate = FusionPolicy::WeightedLinear {
                signals: signal_names.to_vec(),
                weights: weights.clone(),
                threshold: t,
            };
            let agreement = score_pairs(&candidate, &train_pairs).agreement;
            let better = match &best {
                None => true,
                Some((_, _, best_agreement)) => agreement > *best_agreement,
            };
            if better {
                best = Some((weights.clone(), t, agreement));
            }
        }
    }

    let (weights, threshold, train_agreement) = best?;
    let mut train_queries: Vec<String> =
        train_set.into_iter().map(|s| s.to_string()).collect();
    train_queries.sort();
    Some(WeightedFit {
        policy: FusionPolicy::WeightedLinear {
            signals: signal_names.to_vec(),
            weights,
            threshold,
        },
        train_queries,
        train_agreement,
    })
}

/// All weight vectors over `values`, `arity` positions, odometer order.
fn weight_grid(values: &[f64], arity: usize) -> Vec<Vec<f64>> {
    let mut out = Vec::with_capacity(values.len().pow(arity as u32));
    let mut current = vec![0usize; arity];
    loop {
        out.push(current.iter().map(|&i| values[i]).collect());
        let mut pos = arity;
        loop {
            if pos == 0 {
                return out;
            }
            pos -= 1;
            current[pos] += 1;
            if current[pos] < values.len() {
                break;
            }
            current[pos] = 0;
        }
    }
}

// ---------------------------------------------------------------------------
// Top-policy analysis
// ---------------------------------------------------------------------------

/// A pair the policy got wrong, for manual inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub key: PairKey,
    pub truth: u8,
    pub predicted: u8,
    pub class: QueryClass,
}

/// Drill-down for the selected top policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyAnalysis {
    pub overall: MetricsRecord,
    pub per_class: BTreeMap<QueryClass, MetricsRecord>,
    pub per_query: BTreeMap<String, MetricsRecord>,
    pub failures: Vec<FailureRecord>,
}

/// Per-class and per-query breakdown plus the explicit failing-pair list.
pub fn analyze_policy(policy: &FusionPolicy, set: &FusionSet) -> PolicyAnalysis {
    let mut per_class_pairs: BTreeMap<QueryClass, Vec<FusionPair>> = BTreeMap::new();
    let mut per_query_pairs: BTreeMap<String, Vec<FusionPair>> = BTreeMap::new();
    let mut failures = Vec::new();

    for pair in &set.pairs {
        per_class_pairs
            .entry(pair.class)
            .or_default()
            .push(pair.clone());
        per_query_pairs
            .entry(pair.key.query_id.clone())
            .or_default()
            .push(pair.clone());

        let predicted = policy.decide(&pair.signals, pair.class);
        if predicted != pair.truth {
            failures.push(FailureRecord {
                key: pair.key.clone(),
                truth: pair.truth,
                predicted,
                class: pair.class,
            });
        }
    }

    PolicyAnalysis {
        overall: evaluate_policy(policy, set),
        per_class: per_class_pairs
            .iter()
            .map(|(c, pairs)| (*c, score_pairs(policy, pairs)))
            .collect(),
        per_query: per_query_pairs
            .iter()
            .map(|(q, pairs)| (q.clone(), score_pairs(policy, pairs)))
            .collect(),
        failures,
    }
}
