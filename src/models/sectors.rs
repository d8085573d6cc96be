use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::constants::is_index;

/// Name used for the pseudo-sector grouping the market indices
pub const INDEX_SECTOR: &str = "Indice";

/// Name used when a security cannot be classified
pub const OTHER_SECTOR: &str = "Autres";

/// Sector classification for listed securities
///
/// The listing page carries a sector column for most securities; this map
/// is the fallback for rows where it is missing. An optional
/// `sectors.json` file (`{"sector": ["TICKER", ...], ...}`) overrides the
/// built-in table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorMap {
    #[serde(flatten)]
    groups: HashMap<String, Vec<String>>,
}

impl SectorMap {
    /// Load sector groups from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let groups: HashMap<String, Vec<String>> = serde_json::from_str(&content)?;
        Ok(Self { groups })
    }

    /// Load `sectors.json` from the working directory if present,
    /// otherwise fall back to the built-in classification
    pub fn load_default() -> Self {
        match Self::from_file("sectors.json") {
            Ok(map) => map,
            Err(_) => Self::builtin(),
        }
    }

    /// Built-in classification of the main BRVM listings
    pub fn builtin() -> Self {
        let mut groups = HashMap::new();
        groups.insert(
            "Banque".to_string(),
            to_vec(&["SGBC", "BOAC", "BOAB", "BOABF", "BOAM", "BOAN", "BOAS", "ETIT", "SIBC", "NSBC", "BICC", "CBIBF", "ORGT"]),
        );
        groups.insert(
            "Agro-industrie".to_string(),
            to_vec(&["SOGC", "SPHC", "PALC", "SICC", "SCRC", "SLBC"]),
        );
        groups.insert(
            "Distribution".to_string(),
            to_vec(&["CFAC", "BNBC", "SHEC", "TTLC", "TTLS"]),
        );
        groups.insert(
            "Services publics".to_string(),
            to_vec(&["SDCC", "CIEC", "SNTS", "ONTBF"]),
        );
        groups.insert(
            "Industrie".to_string(),
            to_vec(&["NTLC", "SMBC", "UNXC", "FTSC", "ABJC", "STBC"]),
        );
        groups.insert(
            "Transport".to_string(),
            to_vec(&["SVOC", "SDSC"]),
        );
        Self { groups }
    }

    /// Classify a ticker, preferring the sector scraped from the listing
    /// page when one was present
    pub fn classify(&self, ticker: &str, scraped: Option<&str>) -> String {
        if is_index(ticker) {
            return INDEX_SECTOR.to_string();
        }

        if let Some(sector) = scraped {
            let sector = sector.trim();
            if !sector.is_empty() && sector != "-" {
                return sector.to_string();
            }
        }

        for (sector, tickers) in &self.groups {
            if tickers.iter().any(|t| t == ticker) {
                return sector.clone();
            }
        }

        OTHER_SECTOR.to_string()
    }

    /// All group names, sorted
    pub fn sector_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups.keys().cloned().collect();
        names.sort();
        names
    }
}

fn to_vec(tickers: &[&str]) -> Vec<String> {
    tickers.iter().map(|t| t.to_string()).collect()
}
