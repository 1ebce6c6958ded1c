//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Queue multipart RAR downloads into Internet Download Manager.
///
/// Reads links from a JSON config (pasted links, URL lists, IDs, or a
/// generated part sequence), resolves landing pages, validates each target
/// and adds the survivors to the IDM queue.
#[derive(Parser, Debug)]
#[command(name = "idm-queue")]
#[command(author, version, about)]
pub struct Args {
    /// Path to the JSON config file (a template is created if it is missing)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Only select and validate links; never call IDM
    #[arg(long)]
    pub dry_run: bool,

    /// Ignore and do not update the resume state
    #[arg(long)]
    pub no_resume: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
