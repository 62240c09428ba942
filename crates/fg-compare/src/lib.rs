//! fg-compare
//!
//! Baseline-vs-treatment comparison: per-pair helps/hurts diff against
//! ground truth, and the [`ComparisonArtifact`] the gate validator consumes.
//!
//! Only pairs present in both result sets are classified; one-sided pairs
//! are excluded from scoring and surfaced as coverage diagnostics so gate
//! deltas always compare like against like.

use std::collections::BTreeMap;

use fg_dataset::PairKey;
use fg_metrics::{compute_metrics, round4, MetricsRecord};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Helps / hurts diff
// ---------------------------------------------------------------------------

/// Per-pair impact of swapping the baseline policy for the treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Impact {
    /// Baseline wrong, treatment right.
    Help,
    /// Baseline right, treatment wrong.
    Hurt,
    Same,
}

/// One classified pair in the comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonDetail {
    pub query_id: String,
    pub font_name: String,
    pub human: u8,
    pub baseline: u8,
    pub treatment: u8,
    pub status: Impact,
}

/// Pairs excluded from the diff because they were not present on both sides
/// (or had no ground truth). Reported, never classified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageDiagnostics {
    pub only_in_baseline: usize,
    pub only_in_treatment: usize,
    pub missing_truth: usize,
    /// Human labels outside {0,1,2}, dropped before the diff.
    #[serde(default)]
    pub invalid_labels: usize,
}

/// Result of the helps/hurts diff over the common key set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpsHurts {
    pub helps: Vec<PairKey>,
    pub hurts: Vec<PairKey>,
    pub coverage: CoverageDiagnostics,
}

impl HelpsHurts {
    pub fn net(&self) -> i64 {
        self.helps.len() as i64 - self.hurts.len() as i64
    }
}

/// Diff two prediction maps against ground truth over their key
/// intersection. Output lists are key-sorted.
pub fn diff(
    baseline: &BTreeMap<PairKey, u8>,
    treatment: &BTreeMap<PairKey, u8>,
    truth: &BTreeMap<PairKey, u8>,
) -> HelpsHurts {
    let mut coverage = CoverageDiagnostics {
        only_in_baseline: baseline.keys().filter(|k| !treatment.contains_key(*k)).count(),
        only_in_treatment: treatment.keys().filter(|k| !baseline.contains_key(*k)).count(),
        missing_truth: 0,
        invalid_labels: 0,
    };

    let mut helps = Vec::new();
    let mut hurts = Vec::new();
    for (key, &b) in baseline {
        let Some(&t) = treatment.get(key) else {
            continue;
        };
        let Some(&h) = truth.get(key) else {
            coverage.missing_truth += 1;
            continue;
        };
        let baseline_correct = b == h;
        let treatment_correct = t == h;
        if treatment_correct && !baseline_correct {
            helps.push(key.clone());
        } else if baseline_correct && !treatment_correct {
            hurts.push(key.clone());
        }
    }

    HelpsHurts {
        helps,
        hurts,
        coverage,
    }
}

// ---------------------------------------------------------------------------
// Comparison artifact
// ---------------------------------------------------------------------------

/// Scalar deltas, treatment minus baseline, rounded to 4 decimal places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsDelta {
    pub agreement: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Helps/hurts summary counts for the gate report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpsHurtsSummary {
    pub helps_count: usize,
    pub hurts_count: usize,
    pub net: i64,
}

/// The full baseline-vs-treatment artifact consumed by gate validation.
///
/// Created once per comparison run; both variants' metrics are computed over
/// the same intersected pair set, so the deltas are like-for-like.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonArtifact {
    pub baseline_name: String,
    pub treatment_name: String,
    /// Variant name -> metrics over the common pair set.
    pub variants: BTreeMap<String, MetricsRecord>,
    /// Absent in a partial artifact; gates that need it record SKIP, not PASS.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_treatment_minus_baseline: Option<MetricsDelta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helps_hurts: Option<HelpsHurtsSummary>,
    pub helps: Vec<PairKey>,
    pub hurts: Vec<PairKey>,
    pub details: Vec<ComparisonDetail>,
    pub coverage: CoverageDiagnostics,
}

impl ComparisonArtifact {
    pub fn baseline_metrics(&self) -> Option<&MetricsRecord> {
        self.variants.get(&self.baseline_name)
    }

    pub fn treatment_metrics(&self) -> Option<&MetricsRecord> {
        self.variants.get(&self.treatment_name)
    }
}

/// Build the comparison artifact from two prediction maps and ground truth.
///
/// Metrics for both variants are computed over the key intersection only
/// (pairs with ground truth); the excluded remainder is reported in
/// `coverage`.
pub fn build_comparison(
    baseline_name: &str,
    treatment_name: &str,
    baseline: &BTreeMap<PairKey, u8>,
    treatment: &BTreeMap<PairKey, u8>,
    truth: &BTreeMap<PairKey, u8>,
) -> ComparisonArtifact {
    let hh = diff(baseline, treatment, truth);

    let mut baseline_rows = Vec::new();
    let mut treatment_rows = Vec::new();
    let mut details = Vec::new();
    for (key, &b) in baseline {
        let Some(&t) = treatment.get(key) else {
            continue;
        };
        let Some(&h) = truth.get(key) else {
            continue;
        };
        baseline_rows.push((b, h));
        treatment_rows.push((t, h));
        let status = if t == h && b != h {
            Impact::Help
        } else if b == h && t != h {
            Impact::Hurt
        } else {
            Impact::Same
        };
        details.push(ComparisonDetail {
            query_id: key.query_id.clone(),
            font_name: key.font_name.clone(),
            human: h,
            baseline: b,
            treatment: t,
            status,
        });
    }

    let baseline_metrics = compute_metrics(&baseline_rows, None);
    let treatment_metrics = compute_metrics(&treatment_rows, None);
    let delta = MetricsDelta {
        agreement: round4(treatment_metrics.agreement - baseline_metrics.agreement),
        precision: round4(treatment_metrics.precision - baseline_metrics.precision),
        recall: round4(treatment_metrics.recall - baseline_metrics.recall),
        f1: round4(treatment_metrics.f1 - baseline_metrics.f1),
    };

    let mut variants = BTreeMap::new();
    variants.insert(baseline_name.to_string(), baseline_metrics);
    variants.insert(treatment_name.to_string(), treatment_metrics);

    ComparisonArtifact {
        baseline_name: baseline_name.to_string(),
        treatment_name: treatment_name.to_string(),
        variants,
        delta_treatment_minus_baseline: Some(delta),
        helps_hurts: Some(HelpsHurtsSummary {
            helps_count: hh.helps.len(),
            hurts_count: hh.hurts.len(),
            net: hh.net(),
        }),
        helps: hh.helps,
        hurts: hh.hurts,
        details,
        coverage: hh.coverage,
    }
}
