mod metrics;
mod price_point;
mod security;
mod sectors;

pub use metrics::{MetricsRecord, SectorMetrics};
pub use price_point::{normalize_series, PricePoint};
pub use security::{Listing, SecurityInfo};
pub use sectors::{SectorMap, INDEX_SECTOR, OTHER_SECTOR};

use std::collections::HashMap;

/// Price history for a single security
pub type PriceSeries = Vec<PricePoint>;

/// Market data collection (ticker -> price history)
pub type MarketData = HashMap<String, PriceSeries>;
