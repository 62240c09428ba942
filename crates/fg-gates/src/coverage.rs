//! Coverage audit for curated (directional / slice) gating runs.
//!
//! Gating a curated trial with partial human coverage silently changes the
//! statistical meaning of the thresholds, so gaps block the run outright:
//! the audit returns a [`CoverageError`] and the caller writes a
//! [`BlockerArtifact`] instead of computing partial gates.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use fg_dataset::{CuratedManifest, PairKey};
use serde::{Deserialize, Serialize};

/// One curated pair lacking required human coverage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageGap {
    #[serde(flatten)]
    pub key: PairKey,
    pub reason: String,
}

/// Incomplete human-label coverage over a curated pair set.
///
/// Fatal for gating: the run must stop with a remediation message rather
/// than certify against a silently shrunken denominator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageError {
    pub missing: Vec<CoverageGap>,
}

impl std::fmt::Display for CoverageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "incomplete human-label coverage: {} curated pair(s) unlabeled; \
             adjudicate the missing pairs and rerun gating",
            self.missing.len()
        )
    }
}

impl std::error::Error for CoverageError {}

/// Verify that every curated pair has a human label.
///
/// Deterministic: gaps come out in manifest order.
pub fn audit_coverage(
    manifest: &CuratedManifest,
    labeled: &BTreeSet<PairKey>,
) -> Result<(), CoverageError> {
    let missing: Vec<CoverageGap> = manifest
        .pairs
        .iter()
        .filter(|key| !labeled.contains(*key))
        .map(|key| CoverageGap {
            key: key.clone(),
            reason: "pair missing from human labels".to_string(),
        })
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CoverageError { missing })
    }
}

/// The BLOCKED artifact written when coverage is incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockerArtifact {
    pub status: String,
    pub reason: String,
    pub missing_count: usize,
    /// First few gaps, enough to start adjudication.
    pub missing_examples: Vec<CoverageGap>,
    pub timestamp: DateTime<Utc>,
}

impl BlockerArtifact {
    const EXAMPLE_LIMIT: usize = 10;

    pub fn from_error(err: &CoverageError, now: DateTime<Utc>) -> Self {
        BlockerArtifact {
            status: "BLOCKED".to_string(),
            reason: "Incomplete human labels for curated pairs".to_string(),
            missing_count: err.missing.len(),
            missing_examples: err
                .missing
                .iter()
                .take(Self::EXAMPLE_LIMIT)
                .cloned()
                .collect(),
            timestamp: now,
        }
    }
}
