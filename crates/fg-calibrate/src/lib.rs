//! fg-calibrate
//!
//! Confidence-threshold calibration for gated judge predictions.
//!
//! Decision rule under threshold `t`: predict 1 iff the judge said match
//! AND its confidence is at least `t`. The calibrator sweeps a fixed
//! candidate grid and keeps the agreement-maximizing threshold; ties keep
//! the lowest candidate (stable first-wins scan).
//!
//! Cross-validation partitions *queries*, not pairs — all pairs sharing a
//! query are correlated, so splitting by pair would leak training signal
//! into the held-out folds.

mod crossval;
mod threshold;

pub use crossval::{cross_validate, CrossValReport, FoldReport, MeanMetrics};
pub use threshold::{
    apply_grouped, calibration_curve, fit_threshold, fit_thresholds_by_class, predict_gated,
    sweep, CalibrationBin, SweepPoint, ThresholdFit,
};
