//! CLI argument definitions using clap
//!
//! Commands:
//! - chronodoc resolve --history <path> [--resource <name>] [--at <rfc3339> | --revision <n>] [--updatable]
//! - chronodoc scan --history <path> --resource <name> [--revision <n>] --group 5,7 --group 9
//! - chronodoc history --history <path>

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::index::NodeReferences;
use crate::storage::memory::RevisionLookup;

/// chronodoc - point-in-time snapshots of versioned documents
#[derive(Parser, Debug)]
#[command(name = "chronodoc")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Where the in-memory store is loaded from.
#[derive(Args, Debug, Clone)]
pub struct HistoryArgs {
    /// JSON history fixture
    #[arg(long)]
    pub history: PathBuf,

    /// How the store maps a timestamp to a revision
    #[arg(long, value_enum, default_value_t = LookupArg::Nearest)]
    pub lookup: LookupArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupArg {
    Floor,
    Nearest,
}

impl From<LookupArg> for RevisionLookup {
    fn from(arg: LookupArg) -> Self {
        match arg {
            LookupArg::Floor => RevisionLookup::Floor,
            LookupArg::Nearest => RevisionLookup::Nearest,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve one snapshot and print its revision
    Resolve {
        #[command(flatten)]
        history: HistoryArgs,

        /// Resource name; required when the history holds several
        #[arg(long)]
        resource: Option<String>,

        /// Point in time (RFC 3339)
        #[arg(long, value_parser = parse_instant, conflicts_with = "revision")]
        at: Option<DateTime<Utc>>,

        /// Revision number, -1 for latest
        #[arg(long, allow_negative_numbers = true)]
        revision: Option<i64>,

        /// Resolve through the write transaction
        #[arg(long)]
        updatable: bool,
    },

    /// Stream index lookup groups through a snapshot
    Scan {
        #[command(flatten)]
        history: HistoryArgs,

        #[arg(long)]
        resource: String,

        /// Revision number, -1 for latest
        #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
        revision: i64,

        /// Comma-separated node keys of one lookup group
        #[arg(long = "group", value_parser = parse_group)]
        groups: Vec<NodeReferences>,
    },

    /// Print every resource's revision timeline
    History {
        #[command(flatten)]
        history: HistoryArgs,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

pub(crate) fn parse_instant(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 time '{}': {}", s, e))
}

pub(crate) fn parse_group(s: &str) -> Result<NodeReferences, String> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u64>()
                .map_err(|_| format!("invalid node key '{}'", part))
        })
        .collect()
}
