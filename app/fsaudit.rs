//! Command-line interface for fsaudit.
//!
//! Walks each path given on the command line, in order, and prints one inventory line per
//! entry to stdout. Diagnostics go to stderr; set `RUST_LOG` to change their verbosity.

use clap::Parser;
use fsaudit::{AuditBuilder, AuditError, audit};
use std::io;
use std::path::PathBuf;
use std::process::exit;
use tracing_subscriber::EnvFilter;

/// fsaudit — permissions, ownership and content checksums for a file tree
#[derive(Parser)]
#[command(name = "fsaudit", version, about, long_about = None)]
struct Cli {
    /// Root paths to walk, in order
    #[arg(required = true)]
    roots: Vec<PathBuf>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_env_filter(filter)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let options = AuditBuilder::new(cli.roots).build();

    match audit(options, io::stdout().lock()) {
        Ok(summary) => {
            tracing::info!(
                entries = summary.entries,
                checksummed = summary.checksummed,
                skipped = summary.skipped,
                walk_errors = summary.walk_errors,
                "audit complete"
            );
        }
        Err(AuditError::Write { source }) if source.kind() == io::ErrorKind::BrokenPipe => {}
        Err(e) => {
            tracing::error!("{}", e);
            exit(1);
        }
    }
}
