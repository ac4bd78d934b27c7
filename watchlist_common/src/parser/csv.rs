//! CSV import with automatic symbol / name column detection.
//!
//! Exported watchlists come in many shapes (`Sr.,Stock Name,Symbol`,
//! `Ticker,Company`, or a bare column of codes), so the header is matched
//! against candidate names first and the data itself is sampled when that
//! fails. CSV imports never carry an exchange; every symbol defaults to NSE.

use log::{debug, info};

use super::ParseResult;
use crate::symbol::{
    Exchange, MAX_SYMBOL_LEN, StockSymbol, clean_symbol_name, is_likely_stock_symbol,
};

/// Upper bound for an uploaded CSV file.
pub const MAX_CSV_BYTES: usize = 1024 * 1024;

/// Data rows inspected when guessing the symbol column from content.
const SAMPLE_ROWS: usize = 5;

/// Share of sampled cells that must look like symbols, as a ratio of tenths.
const SYMBOL_RATIO_TENTHS: usize = 7;

const SYMBOL_HEADERS: &[&str] = &["symbol", "ticker", "code", "scrip"];
const NAME_HEADERS: &[&str] = &[
    "stock name",
    "company name",
    "name",
    "company",
    "stock",
    "security",
];
const LOOSE_SYMBOL_HEADERS: &[&str] = &["sym", "tick", "scrip", "security"];
const LOOSE_NAME_HEADERS: &[&str] = &["ltd", "limited", "corp", "inc"];

/// Column positions picked for a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Columns {
    symbol: Option<usize>,
    stock_name: Option<usize>,
}

/// Parse an uploaded CSV document.
///
/// Structural problems (empty content, fewer than two non-blank lines) end
/// parsing with a single uncounted message. Otherwise every data row either
/// yields a symbol or a `Line N:` error and parsing carries on.
pub fn parse_csv(content: &str) -> ParseResult {
    let mut result = ParseResult::default();

    if content.trim().is_empty() {
        result.notice("CSV content is empty");
        return result;
    }

    let lines = clean_lines(content);
    if lines.len() < 2 {
        result.notice("CSV must have at least a header and one data row");
        return result;
    }

    let headers = parse_csv_line(&lines[0]);
    debug!("CSV headers found: {:?}", headers);

    let columns = detect_columns(&headers, &lines[1..]);
    info!(
        "Detected CSV columns: symbol={:?} stock_name={:?}",
        columns.symbol, columns.stock_name
    );

    let Some(symbol_column) = columns.symbol else {
        extract_from_any_column(&lines[1..], &mut result);
        return result;
    };

    for (offset, line) in lines.iter().enumerate().skip(1) {
        let line_no = offset + 1;
        let cells = parse_csv_line(line);

        let symbol_text = cells.get(symbol_column).map(|c| c.trim()).unwrap_or("");
        if symbol_text.is_empty() {
            result.reject(format!("Line {}: Symbol is empty or missing", line_no));
            continue;
        }

        let symbol = clean_symbol_name(symbol_text);
        if !(2..=MAX_SYMBOL_LEN).contains(&symbol.len()) {
            result.reject(format!("Line {}: Invalid symbol: \"{}\"", line_no, symbol_text));
            continue;
        }

        let stock_name = columns
            .stock_name
            .and_then(|i| cells.get(i))
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        result.accept(StockSymbol::new(Exchange::NSE, symbol, stock_name));
    }

    debug!(
        "CSV parsed: {} accepted, {} rejected",
        result.success_count, result.error_count
    );
    result
}

/// Split one CSV line into trimmed fields.
///
/// Double quotes delimit fields, `""` inside quotes is a literal quote, and a
/// comma only separates fields outside quotes.
pub fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

/// Pre-upload checks on a file's name and content.
///
/// Returns every problem found; an empty vector means the file may be parsed.
pub fn validate_file_content(content: &str, filename: &str) -> Vec<String> {
    let mut errors = Vec::new();

    if content.trim().is_empty() {
        errors.push("File is empty".to_string());
        return errors;
    }

    if !filename.to_lowercase().ends_with(".csv") {
        errors.push("File must be a CSV file (.csv extension)".to_string());
    }

    if content.len() > MAX_CSV_BYTES {
        errors.push("File is too large. Maximum size is 1MB".to_string());
    }

    if clean_lines(content).len() < 2 {
        errors.push("CSV must have at least a header row and one data row".to_string());
    }

    errors
}

/// Strip the BOM, unify line endings, trim lines and drop blank ones.
fn clean_lines(content: &str) -> Vec<String> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    content
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn detect_columns(headers: &[String], data_lines: &[String]) -> Columns {
    let normalized: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();

    let mut symbol = find_column_index(&normalized, SYMBOL_HEADERS);
    let mut stock_name = find_column_index(&normalized, NAME_HEADERS);

    if symbol.is_none() {
        let sample = &data_lines[..data_lines.len().min(SAMPLE_ROWS)];
        symbol = find_symbol_column_by_content(sample);
    }

    if symbol.is_none() {
        symbol = find_column_index(&normalized, LOOSE_SYMBOL_HEADERS);
    }

    if stock_name.is_none() {
        stock_name = find_column_index(&normalized, LOOSE_NAME_HEADERS);
    }

    Columns { symbol, stock_name }
}

/// First header that contains a candidate, or is contained in one.
///
/// Candidates are tried in preference order. Blank headers never match.
fn find_column_index(headers: &[String], candidates: &[&str]) -> Option<usize> {
    candidates.iter().find_map(|name| {
        headers.iter().position(|header| {
            !header.is_empty() && (header.contains(name) || name.contains(header.as_str()))
        })
    })
}

fn find_symbol_column_by_content(sample: &[String]) -> Option<usize> {
    let rows: Vec<Vec<String>> = sample.iter().map(|line| parse_csv_line(line)).collect();
    let width = rows.iter().map(Vec::len).max()?;

    (0..width).find(|&column| {
        let values: Vec<&str> = rows
            .iter()
            .filter_map(|row| row.get(column))
            .map(|cell| cell.trim())
            .filter(|cell| !cell.is_empty())
            .collect();
        let matching = values.iter().filter(|v| is_likely_stock_symbol(v)).count();
        !values.is_empty() && matching * 10 >= values.len() * SYMBOL_RATIO_TENTHS
    })
}

/// Last resort when no column could be identified: take the first
/// symbol-looking cell of every row.
fn extract_from_any_column(data_lines: &[String], result: &mut ParseResult) {
    let mut extracted = 0;

    for (offset, line) in data_lines.iter().enumerate() {
        let line_no = offset + 2;
        let found = parse_csv_line(line)
            .iter()
            .map(|cell| cell.trim())
            .find(|cell| is_likely_stock_symbol(cell))
            .map(clean_symbol_name);

        match found {
            Some(symbol) => {
                result.accept(StockSymbol::new(Exchange::NSE, symbol, None));
                extracted += 1;
            }
            None => result.reject(format!("Line {}: No recognizable symbol found", line_no)),
        }
    }

    if extracted == 0 {
        result.notice("Could not auto-detect any stock symbols in the CSV file");
    }
}
