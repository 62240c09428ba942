use std::collections::BTreeMap;

use fg_compare::ComparisonArtifact;
use fg_config::GateThresholds;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const GATE_AGREEMENT: &str = "G1 (Agreement Delta)";
pub const GATE_PRECISION: &str = "G2 (Precision Delta)";
pub const GATE_HELPS_HURTS: &str = "G3 (Helps/Hurts Net)";
pub const GATE_VISUAL_QA: &str = "G4 (Visual QA)";

// ---------------------------------------------------------------------------
// Gate result types
// ---------------------------------------------------------------------------

/// Status of a single gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateStatus {
    Pass,
    Fail,
    /// A mandatory manual check has not completed.
    Pending,
    /// The gate could not be computed; carries a reason. Not a PASS.
    Skip,
}

impl GateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GateStatus::Pass => "PASS",
            GateStatus::Fail => "FAIL",
            GateStatus::Pending => "PENDING",
            GateStatus::Skip => "SKIP",
        }
    }
}

/// One gate's outcome: status, the measured value, and the threshold it was
/// held against (rendered, for the audit trail).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateResult {
    pub status: GateStatus,
    pub value: Value,
    pub threshold: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Overall promotion verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum Verdict {
    Go,
    NoGo,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Go => "GO",
            Verdict::NoGo => "NO-GO",
        }
    }
}

/// The full gate report artifact: `{"success": bool, "gates": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateReport {
    pub success: bool,
    pub gates: BTreeMap<String, GateResult>,
}

impl GateReport {
    pub fn verdict(&self) -> Verdict {
        if self.success {
            Verdict::Go
        } else {
            Verdict::NoGo
        }
    }

    /// CLI convention: 0 on GO, 1 on NO-GO.
    pub fn exit_code(&self) -> i32 {
        match self.verdict() {
            Verdict::Go => 0,
            Verdict::NoGo => 1,
        }
    }
}

/// Manual visual-QA evidence attached to a gating run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualQa {
    /// Must be exactly "PASS" to clear G4.
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Apply the four governance gates to a comparison artifact.
///
/// G1: agreement delta >= threshold. G2: precision delta >= threshold
/// (small regressions tolerated). G3: helps - hurts strictly above the
/// floor. G4: manual visual QA must report exactly "PASS"; absent or
/// PENDING blocks. A missing metric yields FAIL or SKIP-with-reason, never
/// a silent PASS. Overall success requires all four to be PASS.
pub fn validate_gates(
    comparison: &ComparisonArtifact,
    visual_qa: Option<&VisualQa>,
    thresholds: &GateThresholds,
) -> GateReport {
    let mut gates = BTreeMap::new();

    // G1/G2 — metric deltas. The contract requires the deltas themselves; a
    // partial artifact without them yields SKIP-with-reason, never PASS.
    match &comparison.delta_treatment_minus_baseline {
        Some(delta) => {
            let g1_pass = delta.agreement >= thresholds.g1_agreement_delta_min;
            gates.insert(
                GATE_AGREEMENT.to_string(),
                GateResult {
                    status: if g1_pass {
                        GateStatus::Pass
                    } else {
                        GateStatus::Fail
                    },
                    value: json!(delta.agreement),
                    threshold: format!(">= {}", thresholds.g1_agreement_delta_min),
                    reason: None,
                },
            );
            let g2_pass = delta.precision >= thresholds.g2_precision_delta_min;
            gates.insert(
                GATE_PRECISION.to_string(),
                GateResult {
                    status: if g2_pass {
                        GateStatus::Pass
                    } else {
                        GateStatus::Fail
                    },
                    value: json!(delta.precision),
                    threshold: format!(">= {}", thresholds.g2_precision_delta_min),
                    reason: None,
                },
            );
        }
        None => {
            gates.insert(
                GATE_AGREEMENT.to_string(),
                GateResult {
                    status: GateStatus::Skip,
                    value: json!(null),
                    threshold: format!(">= {}", thresholds.g1_agreement_delta_min),
                    reason: Some("missing metric: no deltas in comparison artifact".to_string()),
                },
            );
            gates.insert(
                GATE_PRECISION.to_string(),
                GateResult {
                    status: GateStatus::Skip,
                    value: json!(null),
                    threshold: format!(">= {}", thresholds.g2_precision_delta_min),
                    reason: Some("missing metric: no deltas in comparison artifact".to_string()),
                },
            );
        }
    }

    // G3 — helps/hurts net, over the reconciled common pair set only.
    let g3 = match &comparison.helps_hurts {
        Some(hh) => {
            let g3_pass = hh.net > thresholds.g3_net_floor;
            GateResult {
                status: if g3_pass {
                    GateStatus::Pass
                } else {
                    GateStatus::Fail
                },
                value: json!(hh.net),
                threshold: format!("> {}", thresholds.g3_net_floor),
                reason: None,
            }
        }
        None => GateResult {
            status: GateStatus::Skip,
            value: json!(null),
            threshold: format!("> {}", thresholds.g3_net_floor),
            reason: Some("missing data: no helps/hurts summary in comparison artifact".to_string()),
        },
    };
    gates.insert(GATE_HELPS_HURTS.to_string(), g3);

    // G4 — manual visual QA. Only an explicit "PASS" clears it; anything
    // else (including absence) leaves the gate PENDING and blocks GO.
    let g4 = match visual_qa {
        Some(qa) if qa.status == "PASS" => GateResult {
            status: GateStatus::Pass,
            value: json!(qa.evidence.clone().unwrap_or_else(|| "Manual".to_string())),
            threshold: "status == PASS".to_string(),
            reason: None,
        },
        Some(qa) if qa.status == "FAIL" => GateResult {
            status: GateStatus::Fail,
            value: json!(qa.evidence.clone().unwrap_or_else(|| "Manual".to_string())),
            threshold: "status == PASS".to_string(),
            reason: None,
        },
        Some(qa) => GateResult {
            status: GateStatus::Pending,
            value: json!(qa.status),
            threshold: "status == PASS".to_string(),
            reason: Some("manual visual QA not completed".to_string()),
        },
        None => GateResult {
            status: GateStatus::Pending,
            value: json!("Manual"),
            threshold: "status == PASS".to_string(),
            reason: Some("manual visual QA not recorded".to_string()),
        },
    };
    gates.insert(GATE_VISUAL_QA.to_string(), g4);

    let success = gates.values().all(|g| g.status == GateStatus::Pass);
    GateReport { success, gates }
}
