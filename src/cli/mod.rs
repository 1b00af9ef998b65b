//! CLI module for chronodoc
//!
//! Provides command-line access to:
//! - resolve: one snapshot by time or revision
//! - scan: index lookup groups streamed through a snapshot
//! - history: revision timelines

mod args;
mod commands;
mod errors;
mod fixture;

pub use args::{Cli, Command, HistoryArgs, LookupArg};
pub use commands::{history_lines, resolve, run_command, scan};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use fixture::{HistoryFixture, NodeFixture, ResourceFixture, RevisionFixture};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    run_command(Cli::parse_args())
}
