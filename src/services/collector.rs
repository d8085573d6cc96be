use chrono::Utc;
use std::path::PathBuf;
use std::time::Instant;

use crate::constants::{DEFAULT_START_DATE, INDEX_TICKERS};
use crate::error::{Error, Result};
use crate::models::{Listing, SectorMap, SecurityInfo};
use crate::services::brvm::BrvmClient;
use crate::services::csv_store;
use crate::services::http::HttpSession;
use crate::services::sika::SikaClient;
use crate::utils::get_data_dir;

/// Collector configuration
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// First date of the historical window ("YYYY-MM-DD")
    pub start_date: String,

    /// Last date of the historical window (defaults to today)
    pub end_date: String,

    /// Where the per-security CSVs and the manifest land
    pub data_dir: PathBuf,

    /// Skip the listing and fetch only these tickers (debug aid)
    pub tickers_override: Option<Vec<String>>,

    /// Skip the per-security dividend pages (faster runs)
    pub skip_dividends: bool,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            start_date: DEFAULT_START_DATE.to_string(),
            end_date: Utc::now().format("%Y-%m-%d").to_string(),
            data_dir: get_data_dir(),
            tickers_override: None,
            skip_dividends: false,
        }
    }
}

/// Outcome summary of one collector run
#[derive(Debug, Default)]
pub struct CollectorReport {
    pub securities: usize,
    pub fetched: usize,
    pub skipped: usize,
    pub total_records: usize,
}

/// Fetches the listing and every security's price history, writes one
/// CSV per security plus the manifest. A failing security is logged and
/// skipped; only a run that produces no data at all is an error.
pub struct Collector {
    config: CollectorConfig,
    sika: SikaClient,
    brvm: BrvmClient,
    sectors: SectorMap,
}

impl Collector {
    pub fn new(config: CollectorConfig) -> Result<Self> {
        Ok(Self {
            config,
            sika: SikaClient::new(HttpSession::new()?),
            brvm: BrvmClient::new(HttpSession::new()?),
            sectors: SectorMap::load_default(),
        })
    }

    pub async fn run(&self) -> Result<CollectorReport> {
        let start_time = Instant::now();
        let mut report = CollectorReport::default();

        let listings = self.resolve_listings().await?;
        report.securities = listings.len();

        println!(
            "🚀 Collecting {} securities + {} indices ({} → {})",
            listings.len(),
            INDEX_TICKERS.len(),
            self.config.start_date,
            self.config.end_date
        );

        let mut manifest: Vec<SecurityInfo> = Vec::new();
        let total = listings.len() + INDEX_TICKERS.len();
        let mut current = 0usize;

        for listing in &listings {
            current += 1;
            match self.collect_security(listing, current, total).await {
                Ok((info, records)) => {
                    manifest.push(info);
                    report.fetched += 1;
                    report.total_records += records;
                }
                Err(e) => {
                    report.skipped += 1;
                    tracing::warn!("Skipping {}: {}", listing.ticker, e);
                    println!("   ❌ [{}/{}] {} - {}", current, total, listing.ticker, e);
                }
            }
        }

        for index in INDEX_TICKERS {
            current += 1;
            let listing = Listing {
                ticker: index.to_string(),
                name: index.to_string(),
                sector: None,
                last_price: 0.0,
            };
            match self.collect_security(&listing, current, total).await {
                Ok((info, records)) => {
                    manifest.push(info);
                    report.fetched += 1;
                    report.total_records += records;
                }
                Err(e) => {
                    report.skipped += 1;
                    tracing::warn!("Skipping index {}: {}", index, e);
                    println!("   ❌ [{}/{}] {} - {}", current, total, index, e);
                }
            }
        }

        if report.fetched == 0 {
            return Err(Error::NoData(
                "no security could be fetched from either source".to_string(),
            ));
        }

        csv_store::write_manifest(&self.config.data_dir, &manifest)?;

        println!(
            "✨ Collection done: ✅{} ❌{} | {} records in {:.0}s",
            report.fetched,
            report.skipped,
            report.total_records,
            start_time.elapsed().as_secs_f64()
        );

        Ok(report)
    }

    /// Listing from Sika Finance, official site as fallback; a ticker
    /// override bypasses both
    async fn resolve_listings(&self) -> Result<Vec<Listing>> {
        if let Some(tickers) = &self.config.tickers_override {
            println!("🐛 Using ticker override: {}", tickers.join(", "));
            return Ok(tickers
                .iter()
                .map(|t| Listing {
                    ticker: t.clone(),
                    name: t.clone(),
                    sector: None,
                    last_price: 0.0,
                })
                .collect());
        }

        match self.sika.fetch_listing().await {
            Ok(listings) => Ok(listings),
            Err(e) => {
                tracing::warn!("Sika Finance listing failed ({}), trying brvm.org", e);
                self.brvm.fetch_listing().await
            }
        }
    }

    /// History (primary then fallback source), dividend, CSV write
    async fn collect_security(
        &self,
        listing: &Listing,
        current: usize,
        total: usize,
    ) -> Result<(SecurityInfo, usize)> {
        let ticker = &listing.ticker;

        let series = match self
            .sika
            .fetch_history(ticker, &self.config.start_date, &self.config.end_date)
            .await
        {
            Ok(series) => series,
            Err(e) => {
                tracing::info!("Sika history failed for {} ({}), trying brvm.org", ticker, e);
                self.brvm
                    .fetch_history(ticker, &self.config.start_date, &self.config.end_date)
                    .await?
            }
        };

        csv_store::write_series(&self.config.data_dir, ticker, &series)?;

        let dividend = if self.config.skip_dividends || crate::constants::is_index(ticker) {
            None
        } else {
            match self.sika.fetch_latest_dividend(ticker).await {
                Ok(dividend) => dividend,
                Err(e) => {
                    tracing::warn!("Dividend lookup failed for {}: {}", ticker, e);
                    None
                }
            }
        };

        let last_price = if listing.last_price > 0.0 {
            listing.last_price
        } else {
            series.last().map(|p| p.close).unwrap_or(0.0)
        };

        println!(
            "   ✅ [{}/{}] {} - {} records",
            current,
            total,
            ticker,
            series.len()
        );

        let info = SecurityInfo {
            ticker: ticker.clone(),
            name: listing.name.clone(),
            sector: self.sectors.classify(ticker, listing.sector.as_deref()),
            last_price,
            dividend,
        };

        let records = series.len();
        Ok((info, records))
    }
}
