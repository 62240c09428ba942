//! fg-config
//!
//! Explicit evaluation configuration. One [`EvalConfig`] value is constructed
//! at process start (from a JSON file or defaults) and passed into each
//! engine component — no process-wide singletons, no env-var reads inside
//! the engine.
//!
//! Every loaded config gets a canonical JSON rendering and a SHA-256
//! `config_hash`, recorded in the run manifest so artifacts are auditable
//! back to the exact parameters that produced them.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

// ---------------------------------------------------------------------------
// Gate thresholds
// ---------------------------------------------------------------------------

/// Fixed governance thresholds for the promotion gates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GateThresholds {
    /// G1: minimum agreement delta (treatment minus baseline).
    pub g1_agreement_delta_min: f64,
    /// G2: minimum precision delta; a small regression is tolerated.
    pub g2_precision_delta_min: f64,
    /// G3: helps minus hurts must exceed this (strict).
    pub g3_net_floor: i64,
}

impl Default for GateThresholds {
    fn default() -> Self {
        GateThresholds {
            g1_agreement_delta_min: 0.01,
            g2_precision_delta_min: -0.02,
            g3_net_floor: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Threshold grid
// ---------------------------------------------------------------------------

/// Candidate-threshold grid for confidence calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdGrid {
    pub min: f64,
    pub max: f64,
    /// Number of grid points, endpoints included.
    pub steps: usize,
}

impl Default for ThresholdGrid {
    fn default() -> Self {
        // 0.00 ..= 1.00 in 0.01 steps.
        ThresholdGrid {
            min: 0.0,
            max: 1.0,
            steps: 101,
        }
    }
}

impl ThresholdGrid {
    /// Materialize the grid, low to high. Scan order is the tie-break order.
    pub fn candidates(&self) -> Vec<f64> {
        if self.steps <= 1 {
            return vec![self.min];
        }
        let span = self.max - self.min;
        (0..self.steps)
            .map(|i| self.min + span * i as f64 / (self.steps - 1) as f64)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Weighted-fusion search space
// ---------------------------------------------------------------------------

/// Grid-search space for fitting the weighted-linear fusion policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionSearchSpace {
    /// Candidate weight values per signal.
    pub weight_set: Vec<f64>,
    /// Candidate decision thresholds for the weighted sum.
    pub threshold_grid: ThresholdGrid,
    /// Number of queries held for training the weight fit.
    pub train_query_count: usize,
}

impl Default for FusionSearchSpace {
    fn default() -> Self {
        FusionSearchSpace {
            weight_set: vec![0.0, 0.25, 0.5, 0.75, 1.0],
            threshold_grid: ThresholdGrid {
                min: 0.1,
                max: 2.5,
                steps: 25,
            },
            train_query_count: 15,
        }
    }
}

// ---------------------------------------------------------------------------
// EvalConfig
// ---------------------------------------------------------------------------

/// Complete engine configuration. All fields have defaults matching the
/// governance contract, so a missing config file means "run the standard
/// evaluation".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Seed for every sampling/partitioning step (CV folds, fusion split).
    pub seed: u64,
    pub k_folds: usize,
    /// Query classes treated as Technical for group calibration.
    pub technical_classes: Vec<String>,
    /// Confidence grid for the threshold sweep.
    pub threshold_grid: ThresholdGrid,
    /// Fallback confidence gate when a held-out group was never fit.
    pub default_threshold: f64,
    pub gates: GateThresholds,
    pub fusion_search: FusionSearchSpace,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            seed: 42,
            k_folds: 5,
            technical_classes: vec!["visual_shape".to_string()],
            threshold_grid: ThresholdGrid::default(),
            default_threshold: 0.9,
            gates: GateThresholds::default(),
            fusion_search: FusionSearchSpace::default(),
        }
    }
}

/// A loaded config plus its canonical rendering and hash.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: EvalConfig,
    pub canonical_json: String,
    pub config_hash: String,
}

/// Load an [`EvalConfig`] from a JSON file; absent fields fall back to
/// contract defaults.
pub fn load_config(path: &Path) -> Result<LoadedConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read config failed: {}", path.display()))?;
    let config: EvalConfig =
        serde_json::from_str(&raw).with_context(|| format!("parse config failed: {}", path.display()))?;
    finalize(config)
}

/// Wrap an in-memory config (defaults, or test-built) with its hash.
pub fn from_config(config: EvalConfig) -> Result<LoadedConfig> {
    finalize(config)
}

fn finalize(config: EvalConfig) -> Result<LoadedConfig> {
    let canonical_json = canonicalize(&config)?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config,
        canonical_json,
        config_hash,
    })
}

/// Canonical JSON: struct field order is fixed by the type, compact
/// rendering, stable float formatting via serde_json.
fn canonicalize(config: &EvalConfig) -> Result<String> {
    serde_json::to_string(config).context("canonical config serialize failed")
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
