//! Command-line arguments for the watchlist client.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use watchlist_common::Exchange;
use watchlist_common::symbol::SortBy;
use watchlist_common::settings::Theme;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// JSON file holding lists, the current selection and settings.
    #[clap(long, env = "WATCHLIST_STORE", default_value = "watchlist.json")]
    pub store: PathBuf,

    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Client operations.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Import symbols from a CSV file into a new list (or an existing one with --list).
    Import {
        /// Path to a `.csv` file, at most 1 MiB.
        path: PathBuf,
        /// Name of the new list; defaults to the file name without extension.
        #[clap(long)]
        name: Option<String>,
        /// Add to this existing list instead of creating one.
        #[clap(long, conflicts_with = "name")]
        list: Option<String>,
    },
    /// Add pasted `EXCHANGE:SYMBOL` tokens, e.g. "NSE:TCS, BSE:500325".
    Paste {
        /// Comma separated tokens.
        text: String,
        /// Name of the new list.
        #[clap(long, required_unless_present = "list")]
        name: Option<String>,
        /// Add to this existing list instead of creating one.
        #[clap(long, conflicts_with = "name")]
        list: Option<String>,
    },
    /// Show all lists.
    Lists,
    /// Show the symbols of a list (the current one by default).
    Show {
        /// List id.
        #[clap(long)]
        list: Option<String>,
        /// Only symbols whose code, exchange or name contains this text.
        #[clap(long)]
        search: Option<String>,
        /// Order by this field instead of list order.
        #[clap(long, value_enum)]
        sort: Option<SortBy>,
        /// Reverse the order given by `--sort`.
        #[clap(long, requires = "sort")]
        desc: bool,
    },
    /// Create an empty list.
    Create {
        /// List name.
        name: String,
    },
    /// Rename a list.
    Rename {
        /// List id.
        id: String,
        /// New name.
        name: String,
    },
    /// Delete a list.
    Delete {
        /// List id.
        id: String,
    },
    /// Select the current list, or clear the selection.
    Use {
        /// List id.
        #[clap(required_unless_present = "none")]
        id: Option<String>,
        /// Clear the selection.
        #[clap(long)]
        none: bool,
    },
    /// Remove a symbol (`EXCHANGE:SYMBOL`) from a list.
    Remove {
        /// List id.
        id: String,
        /// Symbol key, e.g. `NSE:TCS`.
        full_symbol: String,
    },
    /// Print the chart URL of a symbol.
    Open {
        /// Symbol key, e.g. `NSE:TCS`.
        full_symbol: String,
    },
    /// Show or change settings.
    Settings {
        /// Exchange assumed for symbols without one.
        #[clap(long, value_enum, ignore_case = true)]
        default_exchange: Option<Exchange>,
        /// Theme.
        #[clap(long, value_enum, ignore_case = true)]
        theme: Option<Theme>,
        /// Maximum symbols per list.
        #[clap(long)]
        max_symbols: Option<usize>,
    },
    /// Write all data as JSON to stdout or a file.
    Export {
        /// Output file.
        #[clap(long)]
        output: Option<PathBuf>,
    },
    /// Replace all data with a previous export.
    Restore {
        /// File produced by `export`.
        path: PathBuf,
    },
    /// Remove every list and setting.
    Reset,
    /// Mirror the current list and print it again whenever it changes.
    Watch {
        /// Polling interval for changes made by other processes.
        #[clap(long, default_value_t = 500)]
        interval_ms: u64,
        /// Only show symbols whose code, exchange or name contains this text.
        #[clap(long)]
        search: Option<String>,
    },
}
