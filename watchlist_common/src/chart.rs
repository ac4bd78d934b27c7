//! Links to the charting website.

use crate::symbol::StockSymbol;

/// Chart page every symbol link points to.
pub const CHART_BASE_URL: &str = "https://in.tradingview.com/chart/";
/// Query parameter carrying `EXCHANGE:SYMBOL`.
pub const SYMBOL_PARAM: &str = "symbol";

/// Chart URL for `symbol`, e.g. `https://in.tradingview.com/chart/?symbol=NSE%3ATCS`.
pub fn generate_trading_view_url(symbol: &StockSymbol) -> String {
    let encoded = urlencoding::encode(&symbol.full_symbol()).into_owned();
    format!("{}?{}={}", CHART_BASE_URL, SYMBOL_PARAM, encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Exchange;

    #[test]
    fn encodes_the_colon() {
        let url = generate_trading_view_url(&StockSymbol::new(Exchange::NSE, "TCS", None));
        assert_eq!(url, "https://in.tradingview.com/chart/?symbol=NSE%3ATCS");
        assert!(url.ends_with("?symbol=NSE%3ATCS"));
    }

    #[test]
    fn ignores_display_name() {
        let with_name =
            StockSymbol::new(Exchange::BSE, "500325", Some("Reliance Industries".into()));
        assert_eq!(
            generate_trading_view_url(&with_name),
            "https://in.tradingview.com/chart/?symbol=BSE%3A500325"
        );
    }
}
