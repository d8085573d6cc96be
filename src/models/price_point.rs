use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily price observation for a security or index
///
/// Immutable once created; a series holds at most one point per date,
/// sorted ascending. Prices are in FCFA for securities and in index
/// points for the BRVM indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trading day
    pub date: NaiveDate,

    /// Opening price
    pub open: f64,

    /// Highest price
    pub high: f64,

    /// Lowest price
    pub low: f64,

    /// Closing price
    pub close: f64,

    /// Traded volume (number of shares)
    pub volume: u64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Sort a series by date and drop duplicate dates, keeping the last
/// observation for each. Sources occasionally repeat the most recent
/// session in their responses.
pub fn normalize_series(series: Vec<PricePoint>) -> Vec<PricePoint> {
    let mut by_date: std::collections::BTreeMap<NaiveDate, PricePoint> =
        std::collections::BTreeMap::new();
    for point in series {
        by_date.insert(point.date, point);
    }
    by_date.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(day: u32, close: f64) -> PricePoint {
        let date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        PricePoint::new(date, close, close, close, close, 100)
    }

    #[test]
    fn test_normalize_sorts_and_dedups() {
        let series = vec![point(3, 30.0), point(1, 10.0), point(3, 31.0), point(2, 20.0)];
        let normalized = normalize_series(series);

        assert_eq!(normalized.len(), 3);
        assert_eq!(normalized[0].close, 10.0);
        assert_eq!(normalized[1].close, 20.0);
        // Later observation wins on duplicate dates
        assert_eq!(normalized[2].close, 31.0);
    }
}
