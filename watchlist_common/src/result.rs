//! Result type alias shared across the workspace.
//!
//! Defaults the error type to `WatchlistError`, so functions can simply return
//! `Result<T>`.
use crate::error::WatchlistError;

/// Workspace-wide `Result` alias with `WatchlistError` as the default error.
pub type Result<T, E = WatchlistError> = std::result::Result<T, E>;
