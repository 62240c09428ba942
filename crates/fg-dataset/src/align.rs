use std::collections::BTreeMap;

use fg_metrics::remap_label;
use serde::{Deserialize, Serialize};

use crate::types::{HumanDecisionsFile, JudgeResultsFile, PairKey, QueryClass, QueryMeta};

// ---------------------------------------------------------------------------
// Aligned pair
// ---------------------------------------------------------------------------

/// One scoreable pair after the alignment join: binary truth, judge verdict,
/// confidence and calibration group, keyed for stable ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedPair {
    pub key: PairKey,
    /// Binary ground truth (already remapped).
    pub truth: u8,
    pub ai_match: u8,
    pub confidence: f64,
    pub class: QueryClass,
}

/// Soft data-quality counters from the alignment join.
///
/// Exclusions are reported, never fatal: metrics are computed over the
/// resolvable intersection and these counts let a reviewer audit what was
/// dropped and why.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentDiagnostics {
    /// Judged pairs with no human label.
    pub judged_without_label: usize,
    /// Labeled pairs with no judge verdict.
    pub labeled_without_judgment: usize,
    /// Human records with a label outside {0, 1, 2}.
    pub invalid_labels: usize,
    /// Judged pairs whose query has no metadata entry (kept, classed
    /// Subjective).
    pub unclassified_queries: usize,
}

/// The in-memory evaluation set every engine component consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedSet {
    /// Sorted by key for deterministic iteration.
    pub pairs: Vec<AlignedPair>,
    pub diagnostics: AlignmentDiagnostics,
}

impl AlignedSet {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Distinct query ids, sorted.
    pub fn query_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .pairs
            .iter()
            .map(|p| p.key.query_id.clone())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

/// Confidence substituted when a judge artifact carries no confidence field.
const DEFAULT_CONFIDENCE: f64 = 1.0;

/// Join human decisions with judge results over the (query_id, font_name)
/// key intersection.
///
/// Policy applied here, once:
/// - `casey_label` remaps 2 -> 0; out-of-domain labels drop the record and
///   count in `invalid_labels`;
/// - pairs present on only one side are excluded and counted;
/// - each pair gets its calibration group from the query metadata through
///   `technical_classes`.
pub fn align(
    human: &HumanDecisionsFile,
    judge: &JudgeResultsFile,
    queries: &[QueryMeta],
    technical_classes: &[String],
) -> AlignedSet {
    let mut diagnostics = AlignmentDiagnostics::default();

    // Last write wins within an artifact; keys are unique per the data
    // contract, so this only matters for malformed duplicates.
    let mut truth_map: BTreeMap<PairKey, u8> = BTreeMap::new();
    for d in &human.decisions {
        match remap_label(d.casey_label) {
            Ok(truth) => {
                truth_map.insert(PairKey::new(&d.query_id, &d.font_name), truth);
            }
            Err(_) => diagnostics.invalid_labels += 1,
        }
    }

    let class_map: BTreeMap<&str, QueryClass> = queries
        .iter()
        .map(|q| {
            (
                q.id.as_str(),
                QueryClass::from_class_str(&q.class, technical_classes),
            )
        })
        .collect();

    let mut pairs: BTreeMap<PairKey, AlignedPair> = BTreeMap::new();
    for detail in &judge.details {
        let key = PairKey::new(&detail.query_id, &detail.font_name);
        let Some(&truth) = truth_map.get(&key) else {
            diagnostics.judged_without_label += 1;
            continue;
        };
        let class = match class_map.get(detail.query_id.as_str()) {
            Some(&c) => c,
            None => {
                diagnostics.unclassified_queries += 1;
                QueryClass::Subjective
            }
        };
        pairs.insert(
            key.clone(),
            AlignedPair {
                key,
                truth,
                ai_match: detail.ai_match,
                confidence: detail.confidence.unwrap_or(DEFAULT_CONFIDENCE),
                class,
            },
        );
    }

    diagnostics.labeled_without_judgment = truth_map
        .keys()
        .filter(|k| !pairs.contains_key(*k))
        .count();

    AlignedSet {
        pairs: pairs.into_values().collect(),
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HumanDecision, JudgeDetail};

    fn human(records: &[(&str, &str, u8)]) -> HumanDecisionsFile {
        HumanDecisionsFile {
            decisions: records
                .iter()
                .map(|(q, f, l)| HumanDecision {
                    query_id: q.to_string(),
                    font_name: f.to_string(),
                    casey_label: *l,
                })
                .collect(),
        }
    }

    fn judge(records: &[(&str, &str, u8, Option<f64>)]) -> JudgeResultsFile {
        JudgeResultsFile {
            details: records
                .iter()
                .map(|(q, f, m, c)| JudgeDetail {
                    query_id: q.to_string(),
                    font_name: f.to_string(),
                    ai_match: *m,
                    confidence: *c,
                    evidence: None,
                })
                .collect(),
        }
    }

    fn queries() -> Vec<QueryMeta> {
        vec![
            QueryMeta {
                id: "q1".into(),
                text: "geometric sans".into(),
                class: "visual_shape".into(),
            },
            QueryMeta {
                id: "q2".into(),
                text: "cozy bakery".into(),
                class: "semantic_mood".into(),
            },
        ]
    }

    const TECH: &[&str] = &["visual_shape"];

    fn tech() -> Vec<String> {
        TECH.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn intersection_only_with_exclusion_counts() {
        let h = human(&[("q1", "Inter", 1), ("q1", "Lora", 0), ("q2", "Karla", 1)]);
        let j = judge(&[
            ("q1", "Inter", 1, Some(0.95)),
            ("q1", "Merriweather", 0, None), // judged, never labeled
            ("q2", "Karla", 0, Some(0.4)),
        ]);
        let set = align(&h, &j, &queries(), &tech());
        assert_eq!(set.len(), 2);
        assert_eq!(set.diagnostics.judged_without_label, 1);
        assert_eq!(set.diagnostics.labeled_without_judgment, 1);
    }

    #[test]
    fn either_label_remaps_to_negative_truth() {
        let h = human(&[("q1", "Inter", 2)]);
        let j = judge(&[("q1", "Inter", 1, Some(0.9))]);
        let set = align(&h, &j, &queries(), &tech());
        assert_eq!(set.pairs[0].truth, 0);
        assert_eq!(set.pairs[0].ai_match, 1);
    }

    #[test]
    fn invalid_label_excludes_record_and_counts() {
        let h = human(&[("q1", "Inter", 7), ("q1", "Lora", 1)]);
        let j = judge(&[("q1", "Inter", 1, None), ("q1", "Lora", 1, None)]);
        let set = align(&h, &j, &queries(), &tech());
        assert_eq!(set.len(), 1);
        assert_eq!(set.diagnostics.invalid_labels, 1);
        // The invalid-label pair became an unlabeled judged pair.
        assert_eq!(set.diagnostics.judged_without_label, 1);
    }

    #[test]
    fn classes_and_default_confidence_are_assigned() {
        let h = human(&[("q1", "Inter", 1), ("q2", "Karla", 1), ("q9", "Arvo", 0)]);
        let j = judge(&[
            ("q1", "Inter", 1, None),
            ("q2", "Karla", 1, Some(0.8)),
            ("q9", "Arvo", 0, None), // no query metadata
        ]);
        let set = align(&h, &j, &queries(), &tech());
        let by_q: BTreeMap<&str, &AlignedPair> = set
            .pairs
            .iter()
            .map(|p| (p.key.query_id.as_str(), p))
            .collect();
        assert_eq!(by_q["q1"].class, QueryClass::Technical);
        assert_eq!(by_q["q1"].confidence, 1.0);
        assert_eq!(by_q["q2"].class, QueryClass::Subjective);
        assert_eq!(by_q["q9"].class, QueryClass::Subjective);
        assert_eq!(set.diagnostics.unclassified_queries, 1);
    }

    #[test]
    fn pairs_come_out_key_sorted() {
        let h = human(&[("q2", "Karla", 1), ("q1", "Inter", 1)]);
        let j = judge(&[("q2", "Karla", 1, None), ("q1", "Inter", 1, None)]);
        let set = align(&h, &j, &queries(), &tech());
        let keys: Vec<String> = set.pairs.iter().map(|p| p.key.to_string()).collect();
        assert_eq!(keys, vec!["q1/Inter", "q2/Karla"]);
    }
}
