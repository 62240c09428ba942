//! fg-fusion
//!
//! Composite judge policies: fuse several binary judge signals into one
//! decision per pair, score every candidate policy over the evaluation set,
//! and rank them into a leaderboard.
//!
//! Each policy is a pure function of the per-pair signal values and the
//! query class. The weighted-linear variant is the only one with fitted
//! parameters; its grid search trains on a seeded query split and reports
//! on the full set, mirroring the cross-validation discipline used for
//! threshold calibration.

mod policy;
mod set;
mod score;

pub use policy::FusionPolicy;
pub use score::{
    analyze_policy, evaluate_policy, fit_weighted, leaderboard, FailureRecord, LeaderboardEntry,
    PolicyAnalysis, WeightedFit, WeightedSearchSpace,
};
pub use set::{build_fusion_set, FusionDiagnostics, FusionPair, FusionSet};
