//! `fontgate fuse`: score the fixed fusion policies plus the fitted
//! weighted-linear policy over every supplied judge signal, rank them, and
//! drill into the winner.

use anyhow::{Context, Result};
use fg_config::LoadedConfig;
use fg_dataset::JudgeResultsFile;
use fg_fusion::{
    analyze_policy, build_fusion_set, fit_weighted, leaderboard, FusionPolicy,
    WeightedSearchSpace,
};
use std::path::Path;
use tracing::info;

use super::parse_named_path;

pub fn run(
    loaded: &LoadedConfig,
    exports_dir: &Path,
    human: &Path,
    signal_args: &[String],
    policy_args: &[String],
    queries: &Path,
) -> Result<i32> {
    let cfg = &loaded.config;
    let human = fg_dataset::load_human_decisions(human)?;
    let queries = fg_dataset::load_queries(queries)?;

    let mut signal_files: Vec<(String, JudgeResultsFile)> = Vec::new();
    for raw in signal_args {
        let (name, path) = parse_named_path(raw)?;
        signal_files.push((name, fg_dataset::load_judge_results(&path)?));
    }
    let signals: Vec<(String, &JudgeResultsFile)> = signal_files
        .iter()
        .map(|(n, f)| (n.clone(), f))
        .collect();

    let set = build_fusion_set(&human, &signals, &queries, &cfg.technical_classes);
    info!(
        pairs = set.pairs.len(),
        signals = set.signal_names.len(),
        "built fusion set"
    );

    let names = set.signal_names.clone();
    let mut candidates = vec![
        (
            "and".to_string(),
            FusionPolicy::And {
                signals: names.clone(),
            },
        ),
        (
            "or".to_string(),
            FusionPolicy::Or {
                signals: names.clone(),
            },
        ),
        (
            "majority".to_string(),
            FusionPolicy::Majority {
                signals: names.clone(),
            },
        ),
        (
            "class_conditional(and,or)".to_string(),
            FusionPolicy::QueryClassConditional {
                technical: Box::new(FusionPolicy::And {
                    signals: names.clone(),
                }),
                subjective: Box::new(FusionPolicy::Or { signals: names }),
            },
        ),
    ];

    // User-supplied policies (support-gated variants, tuned weight vectors)
    // join the ranking under their given names.
    for raw in policy_args {
        let (name, path) = parse_named_path(raw)?;
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("read policy failed: {}", path.display()))?;
        let policy: FusionPolicy = serde_json::from_str(&text)
            .with_context(|| format!("parse policy failed: {}", path.display()))?;
        candidates.push((name, policy));
    }

    let space = WeightedSearchSpace {
        weight_set: cfg.fusion_search.weight_set.clone(),
        thresholds: cfg.fusion_search.threshold_grid.candidates(),
        train_query_count: cfg.fusion_search.train_query_count,
    };
    let weighted = fit_weighted(&set, &set.signal_names, &space, cfg.seed);
    if let Some(fit) = &weighted {
        candidates.push(("weighted_linear".to_string(), fit.policy.clone()));
    }

    let board = leaderboard(&candidates, &set);
    let analysis = board.first().map(|top| analyze_policy(&top.policy, &set));

    let mut writer = fg_artifacts::RunWriter::create(exports_dir, "fuse", &loaded.config_hash)?;
    writer.write_json("fusion_leaderboard.json", &board)?;
    if let Some(fit) = &weighted {
        writer.write_json("fusion_weighted_fit.json", fit)?;
    }
    if let Some(analysis) = &analysis {
        writer.write_json("fusion_analysis.json", analysis)?;
    }
    let run_id = writer.run_id();
    writer.finish()?;

    println!("run_id={run_id}");
    println!("config_hash={}", loaded.config_hash);
    println!("pairs={}", set.pairs.len());
    for entry in &board {
        println!(
            "policy={} agreement={} f1={}",
            entry.name, entry.metrics.agreement, entry.metrics.f1
        );
    }
    if let Some(top) = board.first() {
        println!("top_policy={}", top.name);
    }
    Ok(0)
}
