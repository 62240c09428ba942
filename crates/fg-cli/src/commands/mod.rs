//! Command handlers for the fontgate CLI.
//!
//! Shared input plumbing lives here; command-specific logic lives in the
//! submodules. Every command writes its artifacts into a fresh run
//! directory under the exports root and seals it with a manifest.

pub mod calibrate;
pub mod compare;
pub mod fuse;
pub mod gates;

use anyhow::{Context, Result};
use fg_config::LoadedConfig;
use fg_dataset::{HumanDecisionsFile, JudgeResultsFile, PairKey};
use fg_metrics::remap_label;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Load the eval config, or fall back to the contract defaults when no path
/// was given.
pub fn load_config_or_default(path: Option<&Path>) -> Result<LoadedConfig> {
    match path {
        Some(p) => fg_config::load_config(p),
        None => fg_config::from_config(fg_config::EvalConfig::default()),
    }
}

/// Parse a `NAME=PATH` CLI argument.
pub fn parse_named_path(raw: &str) -> Result<(String, PathBuf)> {
    let (name, path) = raw
        .split_once('=')
        .with_context(|| format!("expected NAME=PATH, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("expected NAME=PATH with a non-empty name, got '{raw}'");
    }
    Ok((name.to_string(), PathBuf::from(path.trim())))
}

/// Remapped ground-truth labels keyed by pair, plus the count of decisions
/// dropped for carrying a label outside the raw domain. Dropped labels are
/// excluded from every denominator but must stay visible as a diagnostic.
pub fn truth_map(human: &HumanDecisionsFile) -> (BTreeMap<PairKey, u8>, usize) {
    let mut out = BTreeMap::new();
    let mut invalid = 0usize;
    for d in &human.decisions {
        match remap_label(d.casey_label) {
            Ok(label) => {
                out.insert(PairKey::new(d.query_id.clone(), d.font_name.clone()), label);
            }
            Err(_) => invalid += 1,
        }
    }
    (out, invalid)
}

/// Raw judge verdicts keyed by pair.
pub fn prediction_map(judge: &JudgeResultsFile) -> BTreeMap<PairKey, u8> {
    judge
        .details
        .iter()
        .map(|d| {
            (
                PairKey::new(d.query_id.clone(), d.font_name.clone()),
                d.ai_match,
            )
        })
        .collect()
}
