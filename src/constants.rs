//! Pipeline constants
//!
//! Endpoints of the two data sources, the index list, and the numeric
//! conventions used by the metrics engine.
//!
//! ## CSV Format
//!
//! Every security and index gets one CSV file with 6 columns:
//! `date,open,high,low,close,volume`, dates ascending, one row per
//! trading day. Files are fully overwritten on each collector run.

/// Sika Finance quotation page (listing of all tradable securities)
pub const SIKA_LISTING_URL: &str = "https://www.sikafinance.com/marches/cotations-brvm";

/// Sika Finance historical prices JSON API
pub const SIKA_HISTORY_URL: &str = "https://www.sikafinance.com/api/general/GetHistorique";

/// Sika Finance company page (dividend history), append the ticker
pub const SIKA_COMPANY_URL: &str = "https://www.sikafinance.com/bourse/societe";

/// BRVM official quotation page (fallback listing source)
pub const BRVM_LISTING_URL: &str = "https://www.brvm.org/fr/cours-actions/0";

/// BRVM official historical prices page (fallback source), append the ticker
pub const BRVM_HISTORY_URL: &str = "https://www.brvm.org/fr/historique";

/// Market indices fetched alongside individual securities
pub const INDEX_TICKERS: &[&str] = &["BRVM-Composite", "BRVM-30"];

/// Default first date of the historical window
pub const DEFAULT_START_DATE: &str = "2010-01-01";

/// Delay between consecutive requests to the same host (politeness)
pub const REQUEST_DELAY_MS: u64 = 2000;

/// Maximum retries per request before giving up on a security
pub const MAX_RETRIES: u32 = 3;

/// HTTP request timeout in seconds
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Trading days per year, used to annualize daily-return volatility
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Calendar days per year, used to annualize total return
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Number of CSV columns in a price history file
pub const CSV_PRICE_COLUMNS: usize = 6;

/// Name of the per-run manifest file inside the data directory
pub const MANIFEST_FILE: &str = "securities.csv";

/// Check if a ticker is a market index rather than an individual security
pub fn is_index(ticker: &str) -> bool {
    ticker.starts_with("BRVM")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_index() {
        assert!(is_index("BRVM-Composite"));
        assert!(is_index("BRVM-30"));
        assert!(!is_index("SNTS"));
        assert!(!is_index("SGBC"));
    }
}
