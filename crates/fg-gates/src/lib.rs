//! fg-gates
//!
//! The governance gate validator: turns a baseline-vs-treatment
//! [`fg_compare::ComparisonArtifact`] plus the manual visual-QA status into
//! a GO/NO-GO promotion verdict against fixed statistical thresholds.
//!
//! Strict policy: every gate must be exactly PASS for a GO. PENDING (an
//! unfinished manual check) and SKIP (missing data, with reason) both block
//! — the validator never auto-approves on incomplete evidence.

mod coverage;
mod validate;

pub use coverage::{audit_coverage, BlockerArtifact, CoverageError, CoverageGap};
pub use validate::{
    validate_gates, GateReport, GateResult, GateStatus, Verdict, VisualQa, GATE_AGREEMENT,
    GATE_HELPS_HURTS, GATE_PRECISION, GATE_VISUAL_QA,
};
