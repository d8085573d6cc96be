use crate::error::Error;
use crate::services::{Collector, CollectorConfig, CollectorReport};
use crate::utils::get_data_dir;

pub fn run(
    start_date: String,
    end_date: Option<String>,
    tickers: Option<Vec<String>>,
    skip_dividends: bool,
) {
    let config = CollectorConfig {
        start_date,
        end_date: end_date
            .unwrap_or_else(|| chrono::Utc::now().format("%Y-%m-%d").to_string()),
        data_dir: get_data_dir(),
        tickers_override: tickers,
        skip_dividends,
    };

    match collect(config) {
        Ok(report) => {
            if report.skipped > 0 {
                println!(
                    "⚠️  {} securities could not be fetched (see log)",
                    report.skipped
                );
            }
        }
        Err(e) => {
            eprintln!("❌ Collection failed: {}", e);
            std::process::exit(1);
        }
    }
}

pub(crate) fn collect(config: CollectorConfig) -> Result<CollectorReport, Error> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Config(format!("Failed to create runtime: {}", e)))?;

    runtime.block_on(async {
        let collector = Collector::new(config)?;
        collector.run().await
    })
}
