//!
//! Shared library of the watchlist workspace: everything the client and the
//! background host need to parse, store and link stock symbols.
//!
//! This crate aggregates:
//! - `error`: unified error type `WatchlistError` used across the workspace.
//! - `result`: handy `Result<T, WatchlistError>` alias.
//! - `symbol`: `StockSymbol`, `Exchange` and symbol helpers.
//! - `parser`: text and CSV parsing into `ParseResult`.
//! - `upload`: reading CSV files from disk.
//! - `chart`: chart URLs for symbols.
//! - `settings`: persisted `AppSettings`.
//! - `storage`: the key-value façade, its in-memory and file backends.
//! - `lists`: `SymbolList` and the `ListService` operations.
//! - `message`: request/response/event types of the background host.
#![warn(missing_docs)]
pub mod chart;
pub mod error;
pub mod lists;
pub mod message;
pub mod parser;
pub mod result;
pub mod settings;
pub mod storage;
pub mod symbol;
pub mod upload;

pub use chart::generate_trading_view_url;
pub use error::{StorageOperation, WatchlistError};
pub use lists::{ListService, ListUpdate, SymbolList};
pub use parser::{ParseResult, parse_csv, parse_text_input};
pub use result::Result;
pub use storage::{FileStore, KeyValueStore, KeyValueStoreExt, MemoryStore, Subscription};
pub use symbol::{Exchange, StockSymbol, remove_duplicate_symbols};
