//! metabridge: JSON-lines front end to a metadata catalog.
//!
//! Reads one JSON request per line from stdin and writes one JSON response
//! per line to stdout. Logs go to stderr.
//!
//! Usage:
//!   metabridge --catalog catalog.db metalist < requests.jsonl

use std::io::{self, BufWriter};
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use metabridge_cli::{open_catalog, process, Args, Summary};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();

    match run(&args) {
        Ok(summary) if summary.failures == 0 => ExitCode::SUCCESS,
        Ok(summary) => {
            warn!(
                "{} of {} requests failed",
                summary.failures, summary.requests
            );
            ExitCode::FAILURE
        }
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<Summary> {
    let mut catalog = open_catalog(&args.catalog)?;
    info!("Using catalog {}", args.catalog.display());

    let action = args.action();
    let stdin = io::stdin().lock();
    let stdout = BufWriter::new(io::stdout().lock());
    process(&mut catalog, &action, stdin, stdout, args.unbuffered)
}
