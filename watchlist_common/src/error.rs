//! Error types shared by the client, the background host, and the library.
//!
//! `WatchlistError` separates three families of failure: storage backend problems
//! (optionally tagged with the list operation that was running), a missing list,
//! and plain I/O or serialization errors raised while reading files or messages.
//! Parse failures of user input never show up here; they are reported inside
//! `ParseResult`.
use std::io;
use std::string::FromUtf8Error;
use std::sync::PoisonError;

use strum_macros::Display;
use thiserror::Error;

/// Logical list operation that was running when a storage call failed.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "camelCase")]
pub enum StorageOperation {
    GetAllLists,
    GetList,
    CreateList,
    UpdateList,
    DeleteList,
    AddSymbolsToList,
    RemoveSymbolFromList,
    GetCurrentListId,
    SetCurrentListId,
    GetCurrentList,
    GetSettings,
    UpdateSettings,
    ClearAll,
    ExportData,
    ImportData,
}

/// Unified error type of the workspace.
#[derive(Error, Debug)]
pub enum WatchlistError {
    /// I/O error originating from files or standard streams.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic formatting/validation error with a human-readable message.
    #[error("Format error: {0}")]
    Format(String),

    /// UTF-8 conversion error when handling file content.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] FromUtf8Error),

    /// A caller-supplied value was rejected before touching storage.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The uploaded file failed the pre-parse checks (extension, size, structure).
    #[error("Invalid CSV file: {}", .0.join("; "))]
    InvalidFile(Vec<String>),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// The key-value backend could not serve the request.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A storage failure tagged with the list operation that triggered it.
    #[error("Storage error in {operation}: {message}")]
    Storage {
        /// Operation that failed.
        operation: StorageOperation,
        /// Description of the underlying failure.
        message: String,
    },

    /// No list exists with the given id.
    #[error("List not found: {0}")]
    ListNotFound(String),

    /// Adding symbols would push a list past `maxSymbolsPerList`.
    #[error("List would hold {requested} symbols, the limit is {limit}")]
    SymbolLimitExceeded {
        /// Size the list would have after the change.
        requested: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// Channel send failed (e.g., receiver dropped); contains a short context string.
    #[error("Channel send failed: {0}")]
    ChannelSend(String),

    /// Channel receive failed (e.g., sender closed); contains a short context string.
    #[error("Channel receive failed: {0}")]
    ChannelRecv(String),

    /// Error indicating a poisoned mutex/lock was encountered.
    #[error("Mutex Lock Poisoned: {0}")]
    MutexLock(String),
}

impl WatchlistError {
    /// Wrap this error with the list operation it interrupted.
    ///
    /// Not-found, input, format and limit errors are returned untouched so callers can still
    /// tell them apart from backend failures. An already tagged error keeps its
    /// innermost operation.
    pub fn during(self, operation: StorageOperation) -> Self {
        match self {
            WatchlistError::ListNotFound(_)
            | WatchlistError::InvalidInput(_)
            | WatchlistError::Format(_)
            | WatchlistError::SymbolLimitExceeded { .. }
            | WatchlistError::Storage { .. } => self,
            other => WatchlistError::Storage {
                operation,
                message: other.to_string(),
            },
        }
    }
}

impl<T> From<PoisonError<T>> for WatchlistError {
    fn from(err: PoisonError<T>) -> Self {
        WatchlistError::MutexLock(err.to_string())
    }
}
