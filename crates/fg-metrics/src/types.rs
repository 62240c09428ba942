use serde::{Deserialize, Serialize};

/// Raw confusion counts plus the reporting denominator.
///
/// `total` may exceed `tp + fp + fn + tn` when pairs were intentionally
/// excluded from the numerator but the evaluation is still reported against
/// the full candidate-pool size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub tp: usize,
    pub fp: usize,
    pub r#fn: usize,
    pub tn: usize,
    pub total: usize,
}

/// Derived agreement metrics for one policy variant.
///
/// Never mutated in place: every policy variant under evaluation produces
/// its own record. All floats are pre-rounded to 4 decimal places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    /// Fraction of pairs where prediction matches ground truth.
    pub agreement: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Fraction of the denominator the policy predicted positive on.
    pub coverage: f64,
    pub counts: Counts,
}

impl MetricsRecord {
    /// An all-zero record for an empty evaluation set.
    pub fn empty() -> Self {
        MetricsRecord {
            agreement: 0.0,
            precision: 0.0,
            recall: 0.0,
            f1: 0.0,
            coverage: 0.0,
            counts: Counts {
                tp: 0,
                fp: 0,
                r#fn: 0,
                tn: 0,
                total: 0,
            },
        }
    }
}

/// Round to 4 decimal places for report stability.
pub fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round4_is_stable_at_four_places() {
        assert_eq!(round4(0.123_456_7), 0.1235);
        assert_eq!(round4(0.0), 0.0);
        assert_eq!(round4(1.0), 1.0);
    }

    #[test]
    fn counts_serialize_with_fn_key() {
        let c = Counts {
            tp: 1,
            fp: 2,
            r#fn: 3,
            tn: 4,
            total: 10,
        };
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains("\"fn\":3"), "got {json}");
    }
}
