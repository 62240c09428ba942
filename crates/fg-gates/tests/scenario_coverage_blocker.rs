//! Coverage audit blocks gating outright.
//!
//! GREEN when:
//! - A curated manifest with unlabeled pairs fails the audit with every gap
//!   listed in manifest order.
//! - The BLOCKED artifact carries the full missing count but at most ten
//!   examples, enough to start adjudication without dumping the backlog.

use std::collections::BTreeSet;

use chrono::{TimeZone, Utc};
use fg_dataset::{CuratedManifest, PairKey};
use fg_gates::{audit_coverage, BlockerArtifact};

fn manifest_of(n: usize) -> CuratedManifest {
    CuratedManifest {
        pairs: (0..n)
            .map(|i| PairKey::new(format!("q{i:03}"), format!("Font{i:03}")))
            .collect(),
    }
}

#[test]
fn complete_coverage_passes() {
    let manifest = manifest_of(5);
    let labeled: BTreeSet<PairKey> = manifest.pairs.iter().cloned().collect();
    assert!(audit_coverage(&manifest, &labeled).is_ok());
}

#[test]
fn missing_labels_block_with_capped_examples() {
    let manifest = manifest_of(15);
    // Only the first three pairs were ever labeled.
    let labeled: BTreeSet<PairKey> = manifest.pairs[..3].iter().cloned().collect();

    let err = audit_coverage(&manifest, &labeled).expect_err("12 gaps must block");
    assert_eq!(err.missing.len(), 12);
    // Manifest order is preserved: the first gap is the fourth curated pair.
    assert_eq!(err.missing[0].key, PairKey::new("q003", "Font003"));

    let now = Utc.with_ymd_and_hms(2026, 8, 30, 12, 0, 0).unwrap();
    let blocker = BlockerArtifact::from_error(&err, now);
    assert_eq!(blocker.status, "BLOCKED");
    assert_eq!(blocker.missing_count, 12);
    assert_eq!(blocker.missing_examples.len(), 10);
    assert_eq!(blocker.missing_examples[0].key, PairKey::new("q003", "Font003"));
    assert_eq!(blocker.timestamp, now);
}

#[test]
fn extra_labels_beyond_manifest_are_fine() {
    let manifest = manifest_of(3);
    let mut labeled: BTreeSet<PairKey> = manifest.pairs.iter().cloned().collect();
    labeled.insert(PairKey::new("q999", "Stray"));
    assert!(audit_coverage(&manifest, &labeled).is_ok());
}
