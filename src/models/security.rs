use serde::{Deserialize, Serialize};

use crate::constants::is_index;

/// One row of the quotation page: the listing as scraped, before any
/// history has been fetched
#[derive(Debug, Clone)]
pub struct Listing {
    pub ticker: String,
    pub name: String,
    /// Sector column of the listing page, when present
    pub sector: Option<String>,
    /// Last quoted price
    pub last_price: f64,
}

/// Descriptive record for a security, persisted in the manifest CSV
/// (`securities.csv`) and joined back to the price history by the
/// metrics engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityInfo {
    pub ticker: String,
    pub name: String,
    pub sector: String,
    pub last_price: f64,
    /// Latest declared dividend per share, when the company page had one
    pub dividend: Option<f64>,
}

impl SecurityInfo {
    pub fn is_index(&self) -> bool {
        is_index(&self.ticker)
    }
}
