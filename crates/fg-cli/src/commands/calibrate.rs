//! `fontgate calibrate`: per-class threshold fitting, cross-validation, and
//! the confidence calibration curve, written as one artifact run.

use anyhow::Result;
use fg_calibrate::{
    calibration_curve, cross_validate, fit_thresholds_by_class, sweep, CalibrationBin,
    SweepPoint, ThresholdFit,
};
use fg_config::LoadedConfig;
use fg_dataset::{align, AlignmentDiagnostics, QueryClass};
use fg_metrics::{compute_metrics, MetricsRecord};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::info;

#[derive(Serialize)]
struct CalibrationArtifact {
    thresholds: BTreeMap<QueryClass, ThresholdFit>,
    /// Metrics with the fitted per-class thresholds applied to the full set.
    grouped_metrics: MetricsRecord,
    sweep: Vec<SweepPoint>,
    diagnostics: AlignmentDiagnostics,
}

pub fn run(
    loaded: &LoadedConfig,
    exports_dir: &Path,
    human: &Path,
    judge: &Path,
    queries: &Path,
) -> Result<i32> {
    let cfg = &loaded.config;
    let human = fg_dataset::load_human_decisions(human)?;
    let judge = fg_dataset::load_judge_results(judge)?;
    let queries = fg_dataset::load_queries(queries)?;

    let aligned = align(&human, &judge, &queries, &cfg.technical_classes);
    info!(
        pairs = aligned.len(),
        judged_without_label = aligned.diagnostics.judged_without_label,
        labeled_without_judgment = aligned.diagnostics.labeled_without_judgment,
        "aligned human labels with judge results"
    );

    let candidates = cfg.threshold_grid.candidates();
    let fits = fit_thresholds_by_class(&aligned.pairs, &candidates);
    let threshold_map: BTreeMap<QueryClass, f64> =
        fits.iter().map(|(c, f)| (*c, f.threshold)).collect();
    let grouped = fg_calibrate::apply_grouped(&aligned.pairs, &threshold_map, cfg.default_threshold);
    let grouped_metrics = compute_metrics(&grouped, None);

    let cv = cross_validate(
        &aligned.pairs,
        cfg.k_folds,
        cfg.seed,
        &candidates,
        cfg.default_threshold,
    );

    // Judges report confidence on a coarse scale; bin on the observed
    // distinct values.
    let bins: Vec<f64> = aligned
        .pairs
        .iter()
        .filter(|p| p.ai_match == 1)
        .map(|p| (p.confidence * 10_000.0).round() as i64)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|c| c as f64 / 10_000.0)
        .collect();
    let curve: Vec<CalibrationBin> = calibration_curve(&aligned.pairs, &bins);

    let mut writer =
        fg_artifacts::RunWriter::create(exports_dir, "calibrate", &loaded.config_hash)?;
    writer.write_json(
        "calibration.json",
        &CalibrationArtifact {
            thresholds: fits.clone(),
            grouped_metrics: grouped_metrics.clone(),
            sweep: sweep(&aligned.pairs, &candidates, None),
            diagnostics: aligned.diagnostics.clone(),
        },
    )?;
    writer.write_json("crossval.json", &cv)?;
    writer.write_json("calibration_curve.json", &curve)?;
    let run_id = writer.run_id();
    writer.finish()?;

    println!("run_id={run_id}");
    println!("config_hash={}", loaded.config_hash);
    println!("aligned_pairs={}", aligned.len());
    for (class, fit) in &fits {
        println!(
            "threshold_{}={} agreement={}",
            class.as_str().to_lowercase(),
            fit.threshold,
            fit.metrics.agreement
        );
    }
    println!("grouped_agreement={}", grouped_metrics.agreement);
    println!(
        "cv_mean_agreement={} cv_mean_f1={}",
        cv.mean.agreement, cv.mean.f1
    );
    Ok(0)
}
