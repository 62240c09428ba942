use std::collections::BTreeMap;

use fg_dataset::QueryClass;
use serde::{Deserialize, Serialize};

/// A composite decision rule over named judge signals.
///
/// Every variant is a pure function of the per-pair signal values and the
/// query class; evaluation over a pair set is the caller's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FusionPolicy {
    /// 1 iff every named signal voted 1.
    And { signals: Vec<String> },
    /// 1 iff any named signal voted 1.
    Or { signals: Vec<String> },
    /// 1 iff at least ceil((n+1)/2) of the named signals voted 1.
    Majority { signals: Vec<String> },
    /// 1 iff the weighted vote sum clears the threshold. `weights` is
    /// positional over `signals`.
    WeightedLinear {
        signals: Vec<String>,
        weights: Vec<f64>,
        threshold: f64,
    },
    /// Branch on the query class.
    QueryClassConditional {
        technical: Box<FusionPolicy>,
        subjective: Box<FusionPolicy>,
    },
    /// Vote counting with an uncertainty band: predict 1 at `high` or more
    /// supporting votes, 0 at `low` or fewer, otherwise defer to the
    /// tie-breaker signal.
    SupportGated {
        signals: Vec<String>,
        high: usize,
        low: usize,
        tie_breaker: String,
    },
}

impl FusionPolicy {
    /// Decide one pair. Absent signals read as 0.
    pub fn decide(&self, signals: &BTreeMap<String, u8>, class: QueryClass) -> u8 {
        let get = |name: &str| signals.get(name).copied().unwrap_or(0);
        match self {
            FusionPolicy::And { signals: names } => {
                u8::from(!names.is_empty() && names.iter().all(|n| get(n) == 1))
            }
            FusionPolicy::Or { signals: names } => {
                u8::from(names.iter().any(|n| get(n) == 1))
            }
            FusionPolicy::Majority { signals: names } => {
                let votes: usize = names.iter().map(|n| get(n) as usize).sum();
                // ceil((n + 1) / 2): a strict majority, never a bare half.
                let quorum = names.len() / 2 + 1;
                u8::from(votes >= quorum)
            }
            FusionPolicy::WeightedLinear {
                signals: names,
                weights,
                threshold,
            } => {
                let score: f64 = names
                    .iter()
                    .zip(weights)
                    .map(|(n, w)| w * f64::from(get(n)))
                    .sum();
                u8::from(score >= *threshold)
            }
            FusionPolicy::QueryClassConditional {
                technical,
                subjective,
            } => match class {
                QueryClass::Technical => technical.decide(signals, class),
                QueryClass::Subjective => subjective.decide(signals, class),
            },
            FusionPolicy::SupportGated {
                signals: names,
                high,
                low,
                tie_breaker,
            } => {
                let support: usize = names.iter().map(|n| get(n) as usize).sum();
                if support >= *high {
                    1
                } else if support <= *low {
                    0
                } else {
                    get(tie_breaker)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(values: &[(&str, u8)]) -> BTreeMap<String, u8> {
        values.iter().map(|(n, v)| (n.to_string(), *v)).collect()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn and_or_basics() {
        let s = signals(&[("g3", 1), ("fc", 0)]);
        let and = FusionPolicy::And {
            signals: names(&["g3", "fc"]),
        };
        let or = FusionPolicy::Or {
            signals: names(&["g3", "fc"]),
        };
        assert_eq!(and.decide(&s, QueryClass::Technical), 0);
        assert_eq!(or.decide(&s, QueryClass::Technical), 1);
    }

    #[test]
    fn majority_needs_a_strict_quorum() {
        let policy = FusionPolicy::Majority {
            signals: names(&["a", "b", "c"]),
        };
        assert_eq!(policy.decide(&signals(&[("a", 1), ("b", 1)]), QueryClass::Subjective), 1);
        assert_eq!(policy.decide(&signals(&[("a", 1)]), QueryClass::Subjective), 0);
        // ceil((4+1)/2) = 3 of 4.
        let four = FusionPolicy::Majority {
            signals: names(&["a", "b", "c", "d"]),
        };
        assert_eq!(
            four.decide(&signals(&[("a", 1), ("b", 1)]), QueryClass::Subjective),
            0
        );
        assert_eq!(
            four.decide(&signals(&[("a", 1), ("b", 1), ("c", 1)]), QueryClass::Subjective),
            1
        );
    }

    #[test]
    fn weighted_linear_compares_against_threshold() {
        let policy = FusionPolicy::WeightedLinear {
            signals: names(&["g3", "qwen", "fc"]),
            weights: vec![1.0, 0.5, 0.25],
            threshold: 1.25,
        };
        assert_eq!(
            policy.decide(&signals(&[("g3", 1), ("fc", 1)]), QueryClass::Technical),
            1
        );
        assert_eq!(
            policy.decide(&signals(&[("g3", 1)]), QueryClass::Technical),
            0
        );
    }

    #[test]
    fn query_class_conditional_branches() {
        let policy = FusionPolicy::QueryClassConditional {
            technical: Box::new(FusionPolicy::Or {
                signals: names(&["g3", "fc"]),
            }),
            subjective: Box::new(FusionPolicy::And {
                signals: names(&["g3", "fc"]),
            }),
        };
        let s = signals(&[("g3", 1), ("fc", 0)]);
        assert_eq!(policy.decide(&s, QueryClass::Technical), 1);
        assert_eq!(policy.decide(&s, QueryClass::Subjective), 0);
    }

    #[test]
    fn support_gated_defers_in_the_uncertainty_band() {
        let policy = FusionPolicy::SupportGated {
            signals: names(&["g3", "qwen", "fc", "vl"]),
            high: 3,
            low: 1,
            tie_breaker: "g3".to_string(),
        };
        assert_eq!(
            policy.decide(
                &signals(&[("g3", 1), ("qwen", 1), ("fc", 1)]),
                QueryClass::Technical
            ),
            1
        );
        assert_eq!(
            policy.decide(&signals(&[("fc", 1)]), QueryClass::Technical),
            0
        );
        // support == 2: defer to g3.
        assert_eq!(
            policy.decide(&signals(&[("qwen", 1), ("fc", 1)]), QueryClass::Technical),
            0
        );
        assert_eq!(
            policy.decide(&signals(&[("g3", 1), ("fc", 1)]), QueryClass::Technical),
            1
        );
    }

    #[test]
    fn absent_signal_reads_as_negative() {
        let or = FusionPolicy::Or {
            signals: names(&["ghost"]),
        };
        assert_eq!(or.decide(&signals(&[]), QueryClass::Technical), 0);
    }
}
