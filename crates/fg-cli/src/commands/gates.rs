//! `fontgate gates`: the promotion decision. Audits curated-pair coverage
//! first (incomplete coverage blocks the run outright), then holds the
//! comparison artifact against the four governance gates.

use anyhow::{Context, Result};
use chrono::Utc;
use fg_compare::ComparisonArtifact;
use fg_config::LoadedConfig;
use fg_gates::{audit_coverage, validate_gates, BlockerArtifact, VisualQa};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

use super::truth_map;

pub fn run(
    loaded: &LoadedConfig,
    exports_dir: &Path,
    comparison: &Path,
    visual_qa: Option<&Path>,
    manifest: Option<&Path>,
    human: Option<&Path>,
) -> Result<i32> {
    let mut writer = fg_artifacts::RunWriter::create(exports_dir, "gates", &loaded.config_hash)?;

    // Coverage audit runs before any gate: certifying against a silently
    // shrunken denominator is worse than not certifying at all.
    if let Some(manifest_path) = manifest {
        let human_path = human.context("--manifest requires --human for the coverage audit")?;
        let manifest = fg_dataset::load_curated_manifest(manifest_path)?;
        let human = fg_dataset::load_human_decisions(human_path)?;
        let (truth, invalid_labels) = truth_map(&human);
        if invalid_labels > 0 {
            warn!(invalid_labels, "dropped human decisions with labels outside the raw domain");
        }
        let labeled: BTreeSet<_> = truth.into_keys().collect();
        if let Err(err) = audit_coverage(&manifest, &labeled) {
            let blocker = BlockerArtifact::from_error(&err, Utc::now());
            let path = writer.write_json("blocker.json", &blocker)?;
            writer.finish()?;
            error!(
                missing = blocker.missing_count,
                "coverage audit failed; gating blocked"
            );
            println!("status=BLOCKED missing_count={}", blocker.missing_count);
            println!("blocker_path={}", path.display());
            return Ok(2);
        }
        info!(pairs = manifest.pairs.len(), "coverage audit passed");
    }

    let raw = fs::read_to_string(comparison)
        .with_context(|| format!("read comparison failed: {}", comparison.display()))?;
    let artifact: ComparisonArtifact = serde_json::from_str(&raw)
        .with_context(|| format!("parse comparison failed: {}", comparison.display()))?;

    let qa: Option<VisualQa> = match visual_qa {
        Some(p) => {
            let raw = fs::read_to_string(p)
                .with_context(|| format!("read visual-qa failed: {}", p.display()))?;
            Some(
                serde_json::from_str(&raw)
                    .with_context(|| format!("parse visual-qa failed: {}", p.display()))?,
            )
        }
        None => None,
    };

    let report = validate_gates(&artifact, qa.as_ref(), &loaded.config.gates);
    writer.write_json("gates.json", &report)?;
    let run_id = writer.run_id();
    writer.finish()?;

    println!("run_id={run_id}");
    for (name, gate) in &report.gates {
        match &gate.reason {
            Some(reason) => println!(
                "gate={name} status={} value={} threshold=\"{}\" reason=\"{reason}\"",
                gate.status.as_str(),
                gate.value,
                gate.threshold
            ),
            None => println!(
                "gate={name} status={} value={} threshold=\"{}\"",
                gate.status.as_str(),
                gate.value,
                gate.threshold
            ),
        }
    }
    println!("verdict={}", report.verdict().as_str());
    println!("success={}", report.success);
    Ok(report.exit_code())
}
