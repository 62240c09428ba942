//! Fusion policies ranked over a shared signal set.
//!
//! GREEN when:
//! - With three signals where true matches get two votes and false ones
//!   get one, majority voting is perfect, AND under-calls, OR over-calls.
//! - The leaderboard orders by agreement with a stable name tie-break.
//! - The weighted-linear grid fit is deterministic for a fixed seed.

use fg_dataset::{HumanDecisionsFile, JudgeResultsFile, QueryMeta};
use fg_fusion::{
    build_fusion_set, evaluate_policy, fit_weighted, leaderboard, FusionPolicy,
    WeightedSearchSpace,
};

fn human_json(n: usize) -> HumanDecisionsFile {
    let decisions: Vec<String> = (0..n)
        .map(|i| {
            let label = u8::from(i % 2 == 0);
            format!(
                r#"{{"query_id": "q{i:02}", "font_name": "Font{i:02}", "casey_label": {label}}}"#
            )
        })
        .collect();
    serde_json::from_str(&format!(r#"{{"decisions": [{}]}}"#, decisions.join(",")))
        .expect("valid fixture json")
}

/// Signal that votes 1 when `fire` says so for the pair index.
fn signal_json(n: usize, fire: impl Fn(usize) -> bool) -> JudgeResultsFile {
    let details: Vec<String> = (0..n)
        .map(|i| {
            let m = u8::from(fire(i));
            format!(
                r#"{{"query_id": "q{i:02}", "font_name": "Font{i:02}", "ai_match": {m}, "confidence": 0.9}}"#
            )
        })
        .collect();
    serde_json::from_str(&format!(r#"{{"details": [{}]}}"#, details.join(",")))
        .expect("valid fixture json")
}

fn queries(n: usize) -> Vec<QueryMeta> {
    let rows: Vec<String> = (0..n)
        .map(|i| format!(r#"{{"id": "q{i:02}", "text": "query {i}", "class": "mood"}}"#))
        .collect();
    serde_json::from_str(&format!("[{}]", rows.join(","))).expect("valid fixture json")
}

#[test]
fn majority_wins_the_leaderboard() {
    let n = 20;
    let human = human_json(n);
    // Even indices are true matches. Signals a and b vote for matches;
    // signal c dissents on matches but fires alone on non-matches.
    let a = signal_json(n, |i| i % 2 == 0);
    let b = signal_json(n, |i| i % 2 == 0);
    let c = signal_json(n, |i| i % 2 != 0);
    let signals = vec![
        ("a".to_string(), &a),
        ("b".to_string(), &b),
        ("c".to_string(), &c),
    ];
    let set = build_fusion_set(&human, &signals, &queries(n), &["visual_shape".to_string()]);
    assert_eq!(set.pairs.len(), n);

    let names = set.signal_names.clone();
    let candidates = vec![
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
    ];
    let board = leaderboard(&candidates, &set);

    assert_eq!(board[0].name, "majority");
    assert_eq!(board[0].metrics.agreement, 1.0);
    // AND never reaches three votes: all matches missed, non-matches clean.
    let and = FusionPolicy::And {
        signals: names.clone(),
    };
    assert_eq!(evaluate_policy(&and, &set).agreement, 0.5);
    // OR fires on everything: matches right, every non-match a false positive.
    let or = FusionPolicy::Or { signals: names };
    assert_eq!(evaluate_policy(&or, &set).agreement, 0.5);
    // Equal-agreement tie between "and" and "or" breaks by name.
    assert_eq!(board[1].name, "and");
    assert_eq!(board[2].name, "or");
}

#[test]
fn weighted_fit_is_seed_deterministic() {
    let n = 30;
    let human = human_json(n);
    let a = signal_json(n, |i| i % 2 == 0);
    let b = signal_json(n, |i| i % 4 == 0 || i % 2 != 0); // noisy
    let signals = vec![("a".to_string(), &a), ("b".to_string(), &b)];
    let set = build_fusion_set(&human, &signals, &queries(n), &[]);

    let space = WeightedSearchSpace {
        weight_set: vec![0.0, 0.25, 0.5, 0.75, 1.0],
        thresholds: (1..=25).map(|i| 0.1 * i as f64).collect(),
        train_query_count: 15,
    };

    let first = fit_weighted(&set, &set.signal_names, &space, 42).expect("searchable space");
    let second = fit_weighted(&set, &set.signal_names, &space, 42).expect("searchable space");
    assert_eq!(first.policy, second.policy);
    assert_eq!(first.train_queries, second.train_queries);
    assert_eq!(first.train_agreement, second.train_agreement);

    // A clean signal exists, so a perfect train fit is reachable.
    assert_eq!(first.train_agreement, 1.0);
    assert_eq!(first.train_queries.len(), 15);
}

#[test]
fn majority_is_strict_over_half() {
    let n = 8;
    let human = human_json(n);
    // Two of four signals fire everywhere: exactly half, never a majority.
    let a = signal_json(n, |_| true);
    let b = signal_json(n, |_| true);
    let c = signal_json(n, |_| false);
    let d = signal_json(n, |_| false);
    let signals = vec![
        ("a".to_string(), &a),
        ("b".to_string(), &b),
        ("c".to_string(), &c),
        ("d".to_string(), &d),
    ];
    let set = build_fusion_set(&human, &signals, &queries(n), &[]);

    let majority = FusionPolicy::Majority {
        signals: set.signal_names.clone(),
    };
    let metrics = evaluate_policy(&majority, &set);
    // Every prediction is 0: the true matches all become misses.
    assert_eq!(metrics.counts.tp, 0);
    assert_eq!(metrics.counts.fp, 0);
    assert_eq!(metrics.counts.r#fn, n / 2);
}
