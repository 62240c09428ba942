use std::collections::BTreeMap;

use fg_dataset::{HumanDecisionsFile, JudgeResultsFile, PairKey, QueryClass, QueryMeta};
use fg_metrics::remap_label;
use serde::{Deserialize, Serialize};

/// One pair with every named judge signal attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionPair {
    pub key: PairKey,
    /// Binary ground truth (already remapped).
    pub truth: u8,
    pub class: QueryClass,
    /// Signal name -> binary verdict. A signal that never judged this pair
    /// has no entry; policies read absent signals as 0.
    pub signals: BTreeMap<String, u8>,
}

impl FusionPair {
    /// Signal value with the absent-means-negative convention.
    pub fn signal(&self, name: &str) -> u8 {
        self.signals.get(name).copied().unwrap_or(0)
    }
}

/// Data-quality counters from the multi-signal join.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FusionDiagnostics {
    /// Per signal: labeled pairs that signal never judged.
    pub missing_by_signal: BTreeMap<String, usize>,
    pub invalid_labels: usize,
}

/// The aligned multi-signal evaluation set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionSet {
    /// Sorted by key.
    pub pairs: Vec<FusionPair>,
    pub signal_names: Vec<String>,
    pub diagnostics: FusionDiagnostics,
}

impl FusionSet {
    /// Distinct query ids, sorted.
    pub fn query_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.pairs.iter().map(|p| p.key.query_id.clone()).collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

/// Join several judge-result artifacts against the ground-truth key set.
///
/// The labeled pair set drives the join: every valid human decision yields a
/// pair, and each signal contributes its verdict where present. Missing
/// verdicts are counted per signal, not invented.
pub fn build_fusion_set(
    human: &HumanDecisionsFile,
    signals: &[(String, &JudgeResultsFile)],
    queries: &[QueryMeta],
    technical_classes: &[String],
) -> FusionSet {
    let mut diagnostics = FusionDiagnostics::default();

    let class_map: BTreeMap<&str, QueryClass> = queries
        .iter()
        .map(|q| {
            (
                q.id.as_str(),
                QueryClass::from_class_str(&q.class, technical_classes),
            )
        })
        .collect();

    let mut pairs: BTreeMap<PairKey, FusionPair> = BTreeMap::new();
    for d in &human.decisions {
        let Ok(truth) = remap_label(d.casey_label) else {
            diagnostics.invalid_labels += 1;
            continue;
        };
        let key = PairKey::new(&d.query_id, &d.font_name);
        let class = class_map
            .get(d.query_id.as_str())
            .copied()
            .unwrap_or(QueryClass::Subjective);
        pairs.insert(
            key.clone(),
            FusionPair {
                key,
                truth,
                class,
                signals: BTreeMap::new(),
            },
        );
    }

    for (name, file) in signals {
        for detail in &file.details {
            let key = PairKey::new(&detail.query_id, &detail.font_name);
            if let Some(pair) = pairs.get_mut(&key) {
                pair.signals.insert(name.clone(), detail.ai_match);
            }
        }
        let missing = pairs
            .values()
            .filter(|p| !p.signals.contains_key(name))
            .count();
        diagnostics.missing_by_signal.insert(name.clone(), missing);
    }

    FusionSet {
        pairs: pairs.into_values().collect(),
        signal_names: signals.iter().map(|(n, _)| n.clone()).collect(),
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fg_dataset::{HumanDecision, JudgeDetail};

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

    fn judge(records: &[(&str, &str, u8)]) -> JudgeResultsFile {
        JudgeResultsFile {
            details: records
                .iter()
                .map(|(q, f, m)| JudgeDetail {
                    query_id: q.to_string(),
                    font_name: f.to_string(),
                    ai_match: *m,
                    confidence: None,
                    evidence: None,
                })
                .collect(),
        }
    }

    #[test]
    fn join_is_driven_by_labeled_keys() {
        let h = human(&[("q1", "Inter", 1), ("q1", "Lora", 0)]);
        let g3 = judge(&[("q1", "Inter", 1), ("q1", "Rogue", 1)]); // Rogue unlabeled
        let fc = judge(&[("q1", "Inter", 0)]);
        let set = build_fusion_set(
            &h,
            &[("g3".to_string(), &g3), ("fc".to_string(), &fc)],
            &[],
            &[],
        );
        assert_eq!(set.pairs.len(), 2);
        let inter = &set.pairs[0];
        assert_eq!(inter.signal("g3"), 1);
        assert_eq!(inter.signal("fc"), 0);
        // Lora: g3 never judged it.
        assert_eq!(set.diagnostics.missing_by_signal["g3"], 1);
        assert_eq!(set.diagnostics.missing_by_signal["fc"], 1);
    }

    #[test]
    fn either_labels_become_negatives_and_invalid_labels_drop() {
        let h = human(&[("q1", "Inter", 2), ("q1", "Lora", 9)]);
        let g3 = judge(&[("q1", "Inter", 1)]);
        let set = build_fusion_set(&h, &[("g3".to_string(), &g3)], &[], &[]);
        assert_eq!(set.pairs.len(), 1);
        assert_eq!(set.pairs[0].truth, 0);
        assert_eq!(set.diagnostics.invalid_labels, 1);
    }
}
