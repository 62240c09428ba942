//! File loading for the flat-JSON input artifacts.
//!
//! Pure deserialization with context on failure; all alignment policy lives
//! in [`crate::align`].

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::types::{CuratedManifest, HumanDecisionsFile, JudgeResultsFile, QueryMeta};

/// Load a human-decisions export (`{"decisions": [...]}`).
pub fn load_human_decisions(path: &Path) -> Result<HumanDecisionsFile> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read human decisions failed: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("parse human decisions failed: {}", path.display()))
}

/// Load a judge-results artifact (`{"details": [...]}`).
pub fn load_judge_results(path: &Path) -> Result<JudgeResultsFile> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read judge results failed: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("parse judge results failed: {}", path.display()))
}

/// Load query metadata (a JSON array of `{id, text, class}`).
pub fn load_queries(path: &Path) -> Result<Vec<QueryMeta>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read queries failed: {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse queries failed: {}", path.display()))
}

/// Load a curated-pair manifest (`{"pairs": [...]}`).
pub fn load_curated_manifest(path: &Path) -> Result<CuratedManifest> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read curated manifest failed: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("parse curated manifest failed: {}", path.display()))
}
