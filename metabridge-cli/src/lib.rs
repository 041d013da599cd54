//! Command-line plumbing for the `metabridge` binary.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use metabridge_ops::handler::{error_envelope, handle_request, Action, Response};
use metabridge_ops::{SearchOptions, DEFAULT_MAX_ROWS};
use metabridge_query::Catalog;
use metabridge_store::SqliteCatalog;
use metabridge_types::{ErrorRecord, MetaError, MetadataOp, RecursiveOp};
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Parser, Debug)]
#[command(name = "metabridge", version)]
#[command(about = "Reads JSON requests from stdin and runs them against a metadata catalog")]
pub struct Args {
    /// Path to the SQLite catalog
    #[arg(long, env = "METABRIDGE_CATALOG")]
    pub catalog: PathBuf,

    /// Zone to search in
    #[arg(long, env = "METABRIDGE_ZONE")]
    pub zone: Option<String>,

    /// Maximum number of search results per entity kind
    #[arg(long, default_value_t = DEFAULT_MAX_ROWS)]
    pub max_rows: usize,

    /// Flush output after each response
    #[arg(long)]
    pub unbuffered: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List collections and data objects
    List {
        /// Include metadata
        #[arg(long)]
        avu: bool,
        /// Include access-control entries
        #[arg(long)]
        acl: bool,
    },
    /// Search for collections and data objects by metadata
    Metaquery,
    /// Add or remove metadata
    Metamod {
        #[arg(long, value_enum)]
        operation: MetaOperation,
    },
    /// Change access-control entries
    Chmod {
        /// Apply to everything below a collection too
        #[arg(long)]
        recurse: bool,
    },
    /// List metadata
    Metalist {
        /// Only list AVUs with this attribute name
        #[arg(long)]
        attr: Option<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaOperation {
    Add,
    Rm,
}

impl Args {
    /// The request handler action for the chosen subcommand.
    pub fn action(&self) -> Action {
        match &self.command {
            Command::List { avu, acl } => Action::List {
                avus: *avu,
                access: *acl,
            },
            Command::Metaquery => {
                let mut options = SearchOptions::default().with_max_rows(self.max_rows);
                if let Some(zone) = &self.zone {
                    options = options.with_zone(zone.as_str());
                }
                Action::Search(options)
            }
            Command::Metamod { operation } => Action::ModifyMetadata(match operation {
                MetaOperation::Add => MetadataOp::Add,
                MetaOperation::Rm => MetadataOp::Remove,
            }),
            Command::Chmod { recurse } => Action::ModifyPermissions(RecursiveOp::from(*recurse)),
            Command::Metalist { attr } => Action::ListMetadata {
                attribute: attr.clone(),
            },
        }
    }
}

/// Counts of what [`process`] handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub requests: usize,
    pub failures: usize,
}

/// Opens the catalog named on the command line.
pub fn open_catalog(path: &Path) -> Result<SqliteCatalog> {
    SqliteCatalog::open(path)
        .with_context(|| format!("failed to open catalog {}", path.display()))
}

/// Handles one JSON request per input line, writing one JSON response per
/// output line.
///
/// Blank lines are skipped. A line that is not JSON produces an error
/// envelope and processing continues.
pub fn process<C, R, W>(
    conn: &mut C,
    action: &Action,
    input: R,
    mut output: W,
    unbuffered: bool,
) -> Result<Summary>
where
    C: Catalog + ?Sized,
    R: BufRead,
    W: Write,
{
    let mut summary = Summary::default();
    for (index, line) in input.lines().enumerate() {
        let line = line.context("failed to read request")?;
        if line.trim().is_empty() {
            continue;
        }
        summary.requests += 1;

        let response = match serde_json::from_str::<Value>(&line) {
            Ok(request) => handle_request(conn, action, request),
            Err(err) => {
                warn!(line = index + 1, "invalid JSON request: {err}");
                parse_failure(MetaError::from(err))
            }
        };
        if response.is_error() {
            summary.failures += 1;
        }

        serde_json::to_writer(&mut output, &response.json)?;
        output.write_all(b"\n")?;
        if unbuffered {
            output.flush()?;
        }
    }
    output.flush()?;

    debug!(requests = summary.requests, failures = summary.failures, "input exhausted");
    Ok(summary)
}

fn parse_failure(err: MetaError) -> Response {
    let record = ErrorRecord::from(&err);
    Response {
        json: error_envelope(Value::Null, &record),
        error: Some(record),
    }
}
