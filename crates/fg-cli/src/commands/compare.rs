//! `fontgate compare`: build the baseline-vs-treatment comparison artifact
//! (metric deltas, helps/hurts, per-pair details) consumed by gate
//! validation.

use anyhow::Result;
use fg_config::LoadedConfig;
use std::path::Path;
use tracing::{info, warn};

use super::{parse_named_path, prediction_map, truth_map};

pub fn run(
    loaded: &LoadedConfig,
    exports_dir: &Path,
    human: &Path,
    baseline_arg: &str,
    treatment_arg: &str,
) -> Result<i32> {
    let human = fg_dataset::load_human_decisions(human)?;
    let (truth, invalid_labels) = truth_map(&human);
    if invalid_labels > 0 {
        warn!(invalid_labels, "dropped human decisions with labels outside the raw domain");
    }

    let (baseline_name, baseline_path) = parse_named_path(baseline_arg)?;
    let (treatment_name, treatment_path) = parse_named_path(treatment_arg)?;
    let baseline = prediction_map(&fg_dataset::load_judge_results(&baseline_path)?);
    let treatment = prediction_map(&fg_dataset::load_judge_results(&treatment_path)?);

    let mut artifact = fg_compare::build_comparison(
        &baseline_name,
        &treatment_name,
        &baseline,
        &treatment,
        &truth,
    );
    artifact.coverage.invalid_labels = invalid_labels;
    info!(
        scored = artifact.details.len(),
        only_in_baseline = artifact.coverage.only_in_baseline,
        only_in_treatment = artifact.coverage.only_in_treatment,
        "compared {baseline_name} against {treatment_name}"
    );

    let mut writer = fg_artifacts::RunWriter::create(exports_dir, "compare", &loaded.config_hash)?;
    let path = writer.write_json("comparison.json", &artifact)?;
    let run_id = writer.run_id();
    writer.finish()?;

    println!("run_id={run_id}");
    println!("comparison_path={}", path.display());
    if let Some(delta) = &artifact.delta_treatment_minus_baseline {
        println!("agreement_delta={}", delta.agreement);
        println!("precision_delta={}", delta.precision);
    }
    if let Some(hh) = &artifact.helps_hurts {
        println!("helps={} hurts={} net={}", hh.helps_count, hh.hurts_count, hh.net);
    }
    if invalid_labels > 0 {
        println!("invalid_labels={invalid_labels}");
    }
    Ok(0)
}
