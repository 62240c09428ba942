use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "fontgate")]
#[command(about = "Font-retrieval evaluation and promotion gating CLI", long_about = None)]
struct Cli {
    /// Evaluation config JSON. Omitted means contract defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Root directory for run artifacts.
    #[arg(long, global = true, default_value = "exports")]
    exports_dir: PathBuf,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit confidence thresholds per query class, cross-validate them, and
    /// report the calibration curve.
    Calibrate {
        /// Human decisions JSON
        #[arg(long)]
        human: PathBuf,

        /// AI judge results JSON
        #[arg(long)]
        judge: PathBuf,

        /// Query metadata JSON
        #[arg(long)]
        queries: PathBuf,
    },

    /// Rank fusion policies over multiple judge signals and drill into the
    /// winner.
    Fuse {
        /// Human decisions JSON
        #[arg(long)]
        human: PathBuf,

        /// Judge signal as NAME=PATH; repeat per signal
        #[arg(long = "signal", required = true)]
        signals: Vec<String>,

        /// Extra candidate policy as NAME=PATH to a policy JSON; repeatable
        #[arg(long = "policy")]
        policies: Vec<String>,

        /// Query metadata JSON
        #[arg(long)]
        queries: PathBuf,
    },

    /// Compare a treatment judge run against a baseline over shared ground
    /// truth.
    Compare {
        /// Human decisions JSON
        #[arg(long)]
        human: PathBuf,

        /// Baseline judge run as NAME=PATH
        #[arg(long)]
        baseline: String,

        /// Treatment judge run as NAME=PATH
        #[arg(long)]
        treatment: String,
    },

    /// Validate the promotion gates over a comparison artifact.
    /// Exit code: 0 GO, 1 NO-GO, 2 BLOCKED (coverage).
    Gates {
        /// Comparison artifact JSON (from `fontgate compare`)
        #[arg(long)]
        comparison: PathBuf,

        /// Manual visual-QA record JSON (absent => G4 PENDING)
        #[arg(long)]
        visual_qa: Option<PathBuf>,

        /// Curated pair manifest; when given, human coverage is audited first
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Human decisions JSON (required with --manifest)
        #[arg(long)]
        human: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let loaded = commands::load_config_or_default(cli.config.as_deref())?;

    let code = match cli.cmd {
        Commands::Calibrate {
            human,
            judge,
            queries,
        } => commands::calibrate::run(&loaded, &cli.exports_dir, &human, &judge, &queries)?,

        Commands::Fuse {
            human,
            signals,
            policies,
            queries,
        } => commands::fuse::run(
            &loaded,
            &cli.exports_dir,
            &human,
            &signals,
            &policies,
            &queries,
        )?,

        Commands::Compare {
            human,
            baseline,
            treatment,
        } => commands::compare::run(&loaded, &cli.exports_dir, &human, &baseline, &treatment)?,

        Commands::Gates {
            comparison,
            visual_qa,
            manifest,
            human,
        } => commands::gates::run(
            &loaded,
            &cli.exports_dir,
            &comparison,
            visual_qa.as_deref(),
            manifest.as_deref(),
            human.as_deref(),
        )?,
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
