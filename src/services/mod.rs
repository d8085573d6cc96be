pub mod analytics;
pub mod brvm;
pub mod collector;
pub mod csv_store;
pub mod http;
pub mod publisher;
pub mod sika;

pub use analytics::{build_records, compute_series_metrics, sector_averages, SeriesMetrics};
pub use brvm::BrvmClient;
pub use collector::{Collector, CollectorConfig, CollectorReport};
pub use http::HttpSession;
pub use publisher::{publish, PublishOutcome};
pub use sika::SikaClient;
