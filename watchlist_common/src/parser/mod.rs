//! Turning untrusted user input into validated `StockSymbol` records.
//!
//! Two entry points exist: [`parse_text_input`] for pasted `EXCHANGE:SYMBOL`
//! lists and [`parse_csv`] for uploaded files. Neither returns an error; every
//! rejected token or line becomes a message in [`ParseResult::errors`].
//!
//! - `text`: comma separated `EXCHANGE:SYMBOL` tokens.
//! - `csv`: quoted-field tokenizer, column detection and row extraction.
pub mod csv;
pub mod text;

pub use csv::{MAX_CSV_BYTES, parse_csv, parse_csv_line, validate_file_content};
pub use text::parse_text_input;

use serde::Serialize;

use crate::symbol::StockSymbol;

/// Outcome of parsing one input: accepted symbols plus diagnostics.
///
/// `success_count` always equals `symbols.len()`. `error_count` counts rejected
/// tokens or lines only; messages about the input as a whole (empty input, too
/// few lines, nothing detected) land in `errors` without being counted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    /// Accepted symbols in input order.
    pub symbols: Vec<StockSymbol>,
    /// Human-readable diagnostics.
    pub errors: Vec<String>,
    /// Number of accepted symbols.
    pub success_count: usize,
    /// Number of rejected tokens or lines.
    pub error_count: usize,
}

impl ParseResult {
    pub(crate) fn accept(&mut self, symbol: StockSymbol) {
        self.symbols.push(symbol);
        self.success_count += 1;
    }

    pub(crate) fn reject(&mut self, message: String) {
        self.errors.push(message);
        self.error_count += 1;
    }

    pub(crate) fn notice(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// `true` when at least one symbol was accepted.
    pub fn has_symbols(&self) -> bool {
        !self.symbols.is_empty()
    }

    /// The first `limit` diagnostics, for compact display.
    pub fn first_errors(&self, limit: usize) -> &[String] {
        &self.errors[..self.errors.len().min(limit)]
    }
}
