//! Parsing of pasted text such as `NSE:INNOVANA, BSE:CIANAGRO`.

use log::debug;

use super::ParseResult;
use crate::symbol::StockSymbol;

/// Parse comma separated `EXCHANGE:SYMBOL` tokens.
///
/// Empty tokens are skipped. Each rejected token produces one error prefixed
/// with its 1-based position among the non-empty tokens. Symbols keep input
/// order and are not de-duplicated.
pub fn parse_text_input(text: &str) -> ParseResult {
    let mut result = ParseResult::default();

    if text.trim().is_empty() {
        result.notice("Text input is empty");
        return result;
    }

    let tokens: Vec<&str> = text
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if tokens.is_empty() {
        result.notice("No symbols found in text input");
        return result;
    }

    for (index, token) in tokens.iter().enumerate() {
        match token.parse::<StockSymbol>() {
            Ok(symbol) => result.accept(symbol),
            Err(e) => result.reject(format!("Symbol {}: {}", index + 1, e)),
        }
    }

    debug!(
        "Text input parsed: {} accepted, {} rejected",
        result.success_count, result.error_count
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Exchange;

    #[test]
    fn valid_tokens_are_uppercased() {
        for (input, exchange, code) in [
            ("NSE:ABC", Exchange::NSE, "ABC"),
            ("bse:xyz1", Exchange::BSE, "XYZ1"),
        ] {
            let result = parse_text_input(input);
            assert_eq!(result.symbols.len(), 1);
            assert!(result.errors.is_empty());
            let s = &result.symbols[0];
            assert_eq!(s.exchange, exchange);
            assert_eq!(s.symbol, code);
            assert_eq!(s.full_symbol(), format!("{}:{}", exchange, code));
        }
    }

    #[test]
    fn empty_input_reports_single_uncounted_error() {
        for input in ["", "   \n\t"] {
            let result = parse_text_input(input);
            assert!(result.symbols.is_empty());
            assert_eq!(result.errors, vec!["Text input is empty".to_string()]);
            assert_eq!(result.success_count, 0);
            assert_eq!(result.error_count, 0);
        }
    }

    #[test]
    fn only_commas_finds_nothing() {
        let result = parse_text_input(" , ,, ");
        assert_eq!(result.errors, vec!["No symbols found in text input".to_string()]);
        assert_eq!(result.error_count, 0);
    }

    #[test]
    fn bad_token_in_the_middle() {
        let result = parse_text_input("NSE:AAA, INVALID, BSE:BBB");
        let keys: Vec<String> = result.symbols.iter().map(|s| s.full_symbol()).collect();
        assert_eq!(keys, vec!["NSE:AAA", "BSE:BBB"]);
        assert_eq!(result.success_count, 2);
        assert_eq!(result.error_count, 1);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("Symbol 2: Missing exchange prefix"));
    }

    #[test]
    fn keeps_order_and_duplicates() {
        let result = parse_text_input("NSE:TCS,,NSE:INFY, nse:tcs");
        let keys: Vec<String> = result.symbols.iter().map(|s| s.full_symbol()).collect();
        assert_eq!(keys, vec!["NSE:TCS", "NSE:INFY", "NSE:TCS"]);
    }

    #[test]
    fn each_failure_kind_is_reported() {
        let result = parse_text_input("NYSE:IBM, NSE:A:B, NSE:, NSE:@@");
        assert_eq!(result.error_count, 4);
        assert!(result.errors[0].contains("Unsupported exchange"));
        assert!(result.errors[1].contains("exactly one colon"));
        assert!(result.errors[2].contains("Symbol part is empty"));
        assert!(result.errors[3].contains("Invalid symbol"));
    }
}
