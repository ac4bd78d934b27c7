//! Stock symbols, exchanges and the small helpers shared by both parsers.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

/// Longest symbol code accepted from text input.
pub const MAX_SYMBOL_LEN: usize = 20;

/// Market venues a symbol can belong to.
#[allow(missing_docs)]
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    Display,
    EnumString,
    EnumIter,
    Hash,
    Eq,
    PartialEq,
    PartialOrd,
    Ord,
)]
#[value(rename_all = "UPPER")]
#[strum(ascii_case_insensitive)]
pub enum Exchange {
    #[default]
    NSE,
    BSE,
}

/// Comma separated list of supported exchanges, e.g. `NSE, BSE`.
pub fn supported_exchanges() -> String {
    Exchange::iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Reasons a single `EXCHANGE:SYMBOL` token is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SymbolParseError {
    /// The token has no `:` at all.
    #[error("Missing exchange prefix. Expected format: \"NSE:SYMBOL\" or \"BSE:SYMBOL\"")]
    MissingExchange,

    /// The token has more than one `:`.
    #[error("Invalid symbol format. Expected exactly one colon separator.")]
    InvalidFormat,

    /// The exchange part is not one of the supported venues.
    #[error("Unsupported exchange: \"{0}\". Supported exchanges: {list}", list = supported_exchanges())]
    UnsupportedExchange(String),

    /// Nothing follows the colon.
    #[error("Symbol part is empty")]
    EmptySymbol,

    /// The symbol part has no usable characters or is too long.
    #[error("Invalid symbol: \"{0}\"")]
    InvalidSymbol(String),
}

/// A ticker on a given exchange.
///
/// `full_symbol()` is always derived from `exchange` and `symbol`. The stored
/// form carries a `fullSymbol` field for readers that expect it, but that field
/// is ignored on load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "StoredSymbol", from = "StoredSymbol")]
pub struct StockSymbol {
    /// Uppercase alphanumeric ticker code, without exchange prefix.
    pub symbol: String,
    /// Venue the ticker trades on.
    pub exchange: Exchange,
    /// Optional display label, e.g. `Bharat Gears Limited`.
    pub stock_name: Option<String>,
}

impl StockSymbol {
    /// Build a symbol from already cleaned parts.
    pub fn new(exchange: Exchange, symbol: impl Into<String>, stock_name: Option<String>) -> Self {
        Self {
            symbol: symbol.into(),
            exchange,
            stock_name,
        }
    }

    /// Canonical `EXCHANGE:SYMBOL` key.
    pub fn full_symbol(&self) -> String {
        format!("{}:{}", self.exchange, self.symbol)
    }
}

impl fmt::Display for StockSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.exchange, self.symbol)
    }
}

impl FromStr for StockSymbol {
    type Err = SymbolParseError;

    /// Parses tokens like `NSE:INNOVANA` or ` bse:cianagro `.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let clean_input = token.trim().to_uppercase();
        if !clean_input.contains(':') {
            return Err(SymbolParseError::MissingExchange);
        }

        let parts: Vec<&str> = clean_input.split(':').collect();
        let [exchange_part, symbol_part] = parts.as_slice() else {
            return Err(SymbolParseError::InvalidFormat);
        };

        let exchange_part = exchange_part.trim();
        let exchange = exchange_part
            .parse::<Exchange>()
            .map_err(|_| SymbolParseError::UnsupportedExchange(exchange_part.to_string()))?;

        let symbol_part = symbol_part.trim();
        if symbol_part.is_empty() {
            return Err(SymbolParseError::EmptySymbol);
        }

        let symbol = clean_symbol_name(symbol_part);
        if !is_valid_symbol_name(&symbol) {
            return Err(SymbolParseError::InvalidSymbol(symbol_part.to_string()));
        }

        Ok(StockSymbol::new(exchange, symbol, None))
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSymbol {
    symbol: String,
    exchange: Exchange,
    #[serde(default, skip_deserializing)]
    full_symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stock_name: Option<String>,
}

impl From<StockSymbol> for StoredSymbol {
    fn from(value: StockSymbol) -> Self {
        StoredSymbol {
            full_symbol: value.full_symbol(),
            symbol: value.symbol,
            exchange: value.exchange,
            stock_name: value.stock_name,
        }
    }
}

impl From<StoredSymbol> for StockSymbol {
    fn from(value: StoredSymbol) -> Self {
        StockSymbol::new(value.exchange, value.symbol, value.stock_name)
    }
}

/// Uppercase and drop everything that is not `A-Z` or `0-9`.
pub fn clean_symbol_name(raw: &str) -> String {
    raw.trim()
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        .collect()
}

/// 1 to 20 uppercase alphanumeric characters.
pub fn is_valid_symbol_name(symbol: &str) -> bool {
    (1..=MAX_SYMBOL_LEN).contains(&symbol.len())
        && symbol
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// Heuristic used by CSV column detection: 2-12 alphanumerics, not purely numeric.
pub fn is_likely_stock_symbol(value: &str) -> bool {
    let cleaned = value.trim().to_uppercase();
    (2..=12).contains(&cleaned.len())
        && cleaned
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        && !cleaned.chars().all(|c| c.is_ascii_digit())
}

/// Keep the first occurrence of every `full_symbol()`, preserving order.
pub fn remove_duplicate_symbols(symbols: Vec<StockSymbol>) -> Vec<StockSymbol> {
    let mut seen = HashSet::new();
    symbols
        .into_iter()
        .filter(|s| seen.insert(s.full_symbol()))
        .collect()
}

/// Order by exchange, then by symbol code.
pub fn sort_symbols(symbols: &[StockSymbol]) -> Vec<StockSymbol> {
    let mut sorted = symbols.to_vec();
    sorted.sort_by(|a, b| {
        a.exchange
            .to_string()
            .cmp(&b.exchange.to_string())
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    sorted
}

/// Field the symbol view is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Display, EnumString)]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum SortBy {
    /// Symbol code.
    #[default]
    Symbol,
    /// Exchange name.
    Exchange,
    /// Company name, or the symbol code when there is none.
    StockName,
}

impl SortBy {
    fn key<'a>(&self, symbol: &'a StockSymbol) -> std::borrow::Cow<'a, str> {
        match self {
            SortBy::Symbol => symbol.symbol.as_str().into(),
            SortBy::Exchange => symbol.exchange.to_string().into(),
            SortBy::StockName => symbol
                .stock_name
                .as_deref()
                .filter(|n| !n.is_empty())
                .unwrap_or(&symbol.symbol)
                .into(),
        }
    }
}

/// Order by `by`, ignoring case; equal keys keep their list order.
pub fn sort_symbols_by(symbols: &[StockSymbol], by: SortBy, descending: bool) -> Vec<StockSymbol> {
    let mut sorted = symbols.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = by.key(a).to_lowercase().cmp(&by.key(b).to_lowercase());
        if descending { ordering.reverse() } else { ordering }
    });
    sorted
}

/// Symbols whose code, exchange or name contains `term`, ignoring case.
/// A blank term keeps everything.
pub fn filter_symbols(symbols: &[StockSymbol], term: &str) -> Vec<StockSymbol> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return symbols.to_vec();
    }
    symbols
        .iter()
        .filter(|s| {
            s.symbol.to_lowercase().contains(&term)
                || s.exchange.to_string().to_lowercase().contains(&term)
                || s
                    .stock_name
                    .as_deref()
                    .is_some_and(|n| n.to_lowercase().contains(&term))
        })
        .cloned()
        .collect()
}
