//! fg-dataset
//!
//! Typed ingestion of the flat-JSON evaluation inputs (human decisions,
//! judge results, query metadata, curated-pair manifests) and the alignment
//! join that produces the in-memory evaluation set.
//!
//! The alignment boundary is where data-quality policy lives:
//! - human labels are remapped (2 -> 0) exactly once, here;
//! - invalid labels exclude the record and increment a diagnostic counter;
//! - pairs missing from either side are excluded from scoring and counted,
//!   never treated as silent zeros.
//!
//! Everything downstream (calibration, fusion, comparison, gating) consumes
//! only [`AlignedSet`] and never re-reads raw labels.

mod align;
mod loader;
mod types;

pub use align::{align, AlignedPair, AlignedSet, AlignmentDiagnostics};
pub use loader::{
    load_curated_manifest, load_human_decisions, load_judge_results, load_queries,
};
pub use types::{
    CuratedManifest, HumanDecision, HumanDecisionsFile, JudgeDetail, JudgeResultsFile, PairKey,
    QueryClass, QueryMeta,
};
