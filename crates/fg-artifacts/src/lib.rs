//! fg-artifacts
//!
//! JSON artifact output for evaluation runs. Every run gets its own
//! directory under the exports root, a provenance manifest (run id, command,
//! config hash, creation time, file list), and pretty-printed JSON
//! artifacts. Re-running the same inputs produces byte-identical artifact
//! bodies; only the manifest's run id and timestamp differ.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const SCHEMA_VERSION: i32 = 1;

/// Provenance header for one evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub schema_version: i32,
    pub run_id: Uuid,
    /// The CLI command that produced this run (calibrate, fuse, ...).
    pub command: String,
    /// SHA-256 of the canonical effective config.
    pub config_hash: String,
    pub created_at_utc: DateTime<Utc>,
    /// Artifact file names written into the run directory.
    pub artifacts: Vec<String>,
}

/// An open run directory; artifacts accumulate, then the manifest seals the
/// file list.
pub struct RunWriter {
    run_dir: PathBuf,
    manifest: RunManifest,
}

impl RunWriter {
    /// Create `exports_root/<run_id>/` and an empty manifest.
    pub fn create(exports_root: &Path, command: &str, config_hash: &str) -> Result<Self> {
        let run_id = Uuid::new_v4();
        let run_dir = exports_root.join(run_id.to_string());
        fs::create_dir_all(&run_dir)
            .with_context(|| format!("create run dir failed: {}", run_dir.display()))?;
        Ok(RunWriter {
            run_dir,
            manifest: RunManifest {
                schema_version: SCHEMA_VERSION,
                run_id,
                command: command.to_string(),
                config_hash: config_hash.to_string(),
                created_at_utc: Utc::now(),
                artifacts: Vec::new(),
            },
        })
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    pub fn run_id(&self) -> Uuid {
        self.manifest.run_id
    }

    /// Write one artifact as pretty JSON and record it in the manifest.
    pub fn write_json<T: Serialize>(&mut self, name: &str, value: &T) -> Result<PathBuf> {
        let path = self.run_dir.join(name);
        let json = serde_json::to_string_pretty(value)
            .with_context(|| format!("serialize artifact failed: {name}"))?;
        fs::write(&path, format!("{json}\n"))
            .with_context(|| format!("write artifact failed: {}", path.display()))?;
        self.manifest.artifacts.push(name.to_string());
        Ok(path)
    }

    /// Write `manifest.json` and consume the writer.
    pub fn finish(mut self) -> Result<PathBuf> {
        self.manifest.artifacts.sort();
        let path = self.run_dir.join("manifest.json");
        let json = serde_json::to_string_pretty(&self.manifest)
            .context("serialize manifest failed")?;
        fs::write(&path, format!("{json}\n"))
            .with_context(|| format!("write manifest failed: {}", path.display()))?;
        Ok(path)
    }
}
