//! fg-metrics
//!
//! Confusion-matrix metric computation for judge-vs-human agreement.
//!
//! - Label remapping: raw 3-valued human labels collapse to binary ground
//!   truth exactly once, before any metric touches them (`remap_label`).
//! - Metric computation is pure, order-independent, and degrades to 0.0 on
//!   empty denominators (never NaN, never a panic).
//! - Report floats are rounded to 4 decimal places at computation time so
//!   serialized artifacts are stable across runs.

mod confusion;
mod label;
mod types;

pub use confusion::{classify_outcome, compute_metrics, Outcome};
pub use label::{remap_label, InvalidLabelError, LABEL_EITHER, LABEL_MATCH, LABEL_NO_MATCH};
pub use types::{round4, Counts, MetricsRecord};
