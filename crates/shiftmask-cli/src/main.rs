//! shiftmask CLI
//!
//! Runs the exhaustive fold-safety verification.
//!
//! ```text
//! shiftmask                          # i8, i16, u8, u16
//! shiftmask --domain u8 --domain i8  # selected domains only
//! shiftmask --threads 4 --progress -v
//! ```
//!
//! Exit status is 0 when every domain verifies, 3 when a counterexample is
//! found (printed to stderr), 2 for command-line usage errors, and 1 for any
//! other error.

use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;
use shiftmask::{DomainKind, ExhaustiveVerifier, VerifierConfig, VerifyError};
use tracing::info;
use tracing_subscriber::EnvFilter;

const EXIT_COUNTEREXAMPLE: u8 = 3;

#[derive(Parser)]
#[command(name = "shiftmask")]
#[command(about = "Exhaustively verify when (v >> s) & m can be folded into v & (m << s)")]
#[command(version)]
struct Cli {
    /// Domain to verify (u8, i8, u16, i16); repeat for several. Defaults to all
    #[arg(short, long = "domain", value_name = "TYPE")]
    domains: Vec<DomainKind>,

    /// Number of worker threads (default: one per core)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Log progress while enumerating masks
    #[arg(long)]
    progress: bool,

    /// Print a counterexample as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = VerifierConfig {
        max_threads: cli.threads,
        report_progress: cli.progress,
        ..Default::default()
    };
    let verifier = ExhaustiveVerifier::new(config);

    let domains: &[DomainKind] = if cli.domains.is_empty() {
        &DomainKind::EXHAUSTIVE
    } else {
        &cli.domains
    };

    for report in verifier.run_domains(domains)? {
        info!(
            "{}: {} masks, {} pairs folded, {} pairs rejected, {} values checked",
            report.domain.name,
            report.masks,
            report.pairs_checked,
            report.pairs_skipped,
            report.values_checked
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let err = match run(&cli) {
        Ok(()) => return ExitCode::SUCCESS,
        Err(err) => err,
    };

    let counterexample = err
        .downcast_ref::<VerifyError>()
        .and_then(VerifyError::counterexample);
    match counterexample {
        Some(cx) => {
            if cli.json {
                match serde_json::to_string_pretty(cx) {
                    Ok(json) => eprintln!("{json}"),
                    Err(e) => eprintln!("Counterexample found: {cx} (JSON failed: {e})"),
                }
            } else {
                eprintln!("Counterexample found: {cx}");
            }
            ExitCode::from(EXIT_COUNTEREXAMPLE)
        }
        None => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
