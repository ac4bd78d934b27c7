//! Command-line arguments for the background host.
use std::path::PathBuf;

use clap::Parser;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// JSON file holding lists, the current selection and settings.
    #[clap(long, env = "WATCHLIST_STORE", default_value = "watchlist.json")]
    pub store: PathBuf,

    /// How often to look for changes written by other processes, in milliseconds.
    #[clap(long, default_value_t = 500)]
    pub watch_interval_ms: u64,
}
