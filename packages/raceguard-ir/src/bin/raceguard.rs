//! Raceguard CLI
//!
//! # Usage
//!
//! ```bash
//! # Full analysis of a lowered driver unit
//! raceguard check driver.rir
//!
//! # Custom lock profile, verified pairs left out of the report
//! raceguard check driver.rir --profile uapi.yaml --skip-race-free-pairs
//!
//! # List candidate pairs without verifying them
//! raceguard pairs driver.rir
//! ```

use clap::{Parser, Subcommand};
use raceguard_ir::{
    AnalysisConfig, AnalysisSession, DomainProfile, Outcome, Program, RaceguardError, Result,
    StaticLocksetAnalysis,
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "raceguard")]
#[command(version)]
#[command(about = "Lockset-based race detection for device driver entry points", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse a program and report data races
    Check {
        /// Input program (.rir)
        input: Option<PathBuf>,

        /// Lock API profile (YAML); built-in Linux profile when omitted
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Restrict the analysis to a single entry point
        #[arg(long)]
        analyse_only: Option<String>,

        /// Mark entry points with at most this many call sites as inlined
        /// (0 disables)
        #[arg(long, default_value = "0")]
        inline_bound: usize,

        /// Helper call depth explored by the flow analysis
        #[arg(long, default_value = "16")]
        max_call_depth: usize,

        /// Leave verified pairs out of the report
        #[arg(long)]
        skip_race_free_pairs: bool,

        /// Log every pair region as it is built
        #[arg(long)]
        print_pairs: bool,
    },

    /// List candidate entry point pairs without verifying them
    Pairs {
        /// Input program (.rir)
        input: Option<PathBuf>,

        /// Lock API profile (YAML); built-in Linux profile when omitted
        #[arg(long)]
        profile: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Internal bugs must not escape as panics; every failure mode maps
    // to an exit code.
    let code = match std::panic::catch_unwind(run_cli) {
        Ok(Ok(outcome)) => outcome.exit_code(),
        Ok(Err(err)) => {
            eprintln!("raceguard: error: {err}");
            Outcome::FatalError.exit_code()
        }
        Err(_) => {
            eprintln!("raceguard: error: internal error");
            Outcome::FatalError.exit_code()
        }
    };
    std::process::exit(code);
}

fn run_cli() -> Result<Outcome> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Check {
            input,
            profile,
            analyse_only,
            inline_bound,
            max_call_depth,
            skip_race_free_pairs,
            print_pairs,
        } => {
            let config = AnalysisConfig {
                analyse_only,
                skip_race_free_pairs,
                inline_bound,
                max_call_depth,
                print_pairs,
            };
            run_check(input, profile, config)
        }
        Commands::Pairs { input, profile } => run_pairs(input, profile),
    }
}

fn run_check(
    input: Option<PathBuf>,
    profile: Option<PathBuf>,
    config: AnalysisConfig,
) -> Result<Outcome> {
    let path = validated_input(input)?;
    let profile = load_profile(profile.as_deref())?;
    let program = load_program(&path)?;
    info!(input = %path.display(), unit = %program.unit, "program loaded");

    let engine = StaticLocksetAnalysis::new(config, profile.clone())?;
    let mut session = AnalysisSession::new();
    session.add_unit(program, &profile)?;
    let run = engine.run(&mut session)?;

    for diagnostic in &run.diagnostics {
        println!("warning: {diagnostic}");
    }
    for report in &run.reports {
        println!("{report}");
    }
    let stats = &run.stats;
    println!(
        "checked {} pairs across {} entry points: {} violated, {} verified, {} unknown",
        stats.pairs_built, stats.entry_points, stats.violated, stats.verified, stats.unknown
    );
    Ok(run.outcome())
}

fn run_pairs(input: Option<PathBuf>, profile: Option<PathBuf>) -> Result<Outcome> {
    let path = validated_input(input)?;
    let profile = load_profile(profile.as_deref())?;
    let program = load_program(&path)?;

    let engine = StaticLocksetAnalysis::new(AnalysisConfig::default(), profile.clone())?;
    let mut session = AnalysisSession::new();
    session.add_unit(program, &profile)?;
    let pairs = engine.enumerate_pairs(&mut session)?;

    if pairs.is_empty() {
        println!("no candidate pairs");
    } else {
        for pair in &pairs {
            println!("{pair}");
        }
        println!("{} candidate pairs", pairs.len());
    }
    Ok(Outcome::Success)
}

fn validated_input(input: Option<PathBuf>) -> Result<PathBuf> {
    let Some(path) = input else {
        return Err(RaceguardError::fatal("no input file was specified"));
    };
    if path.extension() != Some(OsStr::new("rir")) {
        return Err(RaceguardError::fatal(format!(
            "'{}' is not a .rir file",
            path.display()
        )));
    }
    Ok(path)
}

fn load_program(path: &Path) -> Result<Program> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn load_profile(path: Option<&Path>) -> Result<DomainProfile> {
    match path {
        Some(path) => Ok(DomainProfile::from_path(path)?),
        None => Ok(DomainProfile::linux()),
    }
}
