use std::collections::HashMap;

use crate::constants::{DAYS_PER_YEAR, TRADING_DAYS_PER_YEAR};
use crate::error::{Error, Result};
use crate::models::{MarketData, MetricsRecord, PricePoint, SectorMetrics, SecurityInfo};
use crate::utils::sanitize_ticker;

/// Raw metrics over one price series, before joining with the manifest
#[derive(Debug, Clone)]
pub struct SeriesMetrics {
    pub first_date: chrono::NaiveDate,
    pub last_date: chrono::NaiveDate,
    pub span_days: i64,
    pub first_price: f64,
    pub last_price: f64,
    pub total_return: f64,
    pub annualized_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
}

/// Compute metrics over one price series
///
/// Returns None when the series is too short (< 2 points) or its first
/// close is not a positive price. Gaps are never interpolated: all
/// formulas run over the observations that exist.
pub fn compute_series_metrics(series: &[PricePoint]) -> Option<SeriesMetrics> {
    if series.len() < 2 {
        return None;
    }

    let first = series.first()?;
    let last = series.last()?;
    if first.close <= 0.0 {
        return None;
    }

    let total_return = last.close / first.close - 1.0;
    let span_days = (last.date - first.date).num_days();

    let annualized_return = if span_days > 0 {
        (1.0 + total_return).powf(DAYS_PER_YEAR / span_days as f64) - 1.0
    } else {
        0.0
    };

    let returns = daily_returns(series);
    let volatility = sample_std_dev(&returns) * TRADING_DAYS_PER_YEAR.sqrt();

    let sharpe_ratio = if volatility > 0.0 {
        annualized_return / volatility
    } else {
        0.0
    };

    Some(SeriesMetrics {
        first_date: first.date,
        last_date: last.date,
        span_days,
        first_price: first.close,
        last_price: last.close,
        total_return,
        annualized_return,
        volatility,
        sharpe_ratio,
        max_drawdown: max_drawdown(series),
    })
}

/// Daily simple returns over consecutive observations
fn daily_returns(series: &[PricePoint]) -> Vec<f64> {
    series
        .windows(2)
        .filter(|w| w[0].close > 0.0)
        .map(|w| w[1].close / w[0].close - 1.0)
        .collect()
}

/// Sample standard deviation (n - 1 denominator); 0 for fewer than two
/// values
fn sample_std_dev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}

/// Maximum drawdown: the most negative value of price / running-max - 1.
/// Always <= 0; exactly 0 for a monotonically non-decreasing series.
fn max_drawdown(series: &[PricePoint]) -> f64 {
    let mut running_max = f64::MIN;
    let mut worst: f64 = 0.0;

    for point in series {
        if point.close > running_max {
            running_max = point.close;
        }
        if running_max > 0.0 {
            let drawdown = point.close / running_max - 1.0;
            if drawdown < worst {
                worst = drawdown;
            }
        }
    }

    worst
}

/// Join the manifest with the loaded price data and compute one
/// MetricsRecord per security
///
/// Securities without a price file or with too little history are
/// logged and skipped. Errors out only when nothing at all could be
/// computed.
pub fn build_records(manifest: &[SecurityInfo], data: &MarketData) -> Result<Vec<MetricsRecord>> {
    let mut records = Vec::new();

    for info in manifest {
        let key = sanitize_ticker(&info.ticker);
        let series = match data.get(&key) {
            Some(series) => series,
            None => {
                tracing::warn!("No price history on disk for {}, skipped", info.ticker);
                continue;
            }
        };

        let metrics = match compute_series_metrics(series) {
            Some(metrics) => metrics,
            None => {
                tracing::warn!(
                    "Price history too short for {} ({} points), skipped",
                    info.ticker,
                    series.len()
                );
                continue;
            }
        };

        let dividend_yield = info.dividend.and_then(|dividend| {
            if metrics.last_price > 0.0 {
                Some(dividend / metrics.last_price)
            } else {
                None
            }
        });

        records.push(MetricsRecord {
            ticker: info.ticker.clone(),
            name: info.name.clone(),
            sector: info.sector.clone(),
            first_date: metrics.first_date,
            last_date: metrics.last_date,
            span_days: metrics.span_days,
            first_price: metrics.first_price,
            last_price: metrics.last_price,
            total_return: metrics.total_return,
            annualized_return: metrics.annualized_return,
            volatility: metrics.volatility,
            sharpe_ratio: metrics.sharpe_ratio,
            max_drawdown: metrics.max_drawdown,
            dividend_yield,
        });
    }

    if records.is_empty() {
        return Err(Error::NoData(
            "no security has enough price history to compute metrics".to_string(),
        ));
    }

    // Ranked by total return, best first
    records.sort_by(|a, b| {
        b.total_return
            .partial_cmp(&a.total_return)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(records)
}

/// Arithmetic means of each metric per sector, sorted by average
/// annualized return
pub fn sector_averages(records: &[MetricsRecord]) -> Vec<SectorMetrics> {
    let mut by_sector: HashMap<&str, Vec<&MetricsRecord>> = HashMap::new();
    for record in records {
        by_sector.entry(record.sector.as_str()).or_default().push(record);
    }

    let mut sectors: Vec<SectorMetrics> = by_sector
        .into_iter()
        .map(|(sector, members)| {
            let n = members.len() as f64;
            SectorMetrics {
                sector: sector.to_string(),
                count: members.len(),
                avg_total_return: members.iter().map(|r| r.total_return).sum::<f64>() / n,
                avg_annualized_return: members.iter().map(|r| r.annualized_return).sum::<f64>() / n,
                avg_volatility: members.iter().map(|r| r.volatility).sum::<f64>() / n,
                avg_sharpe_ratio: members.iter().map(|r| r.sharpe_ratio).sum::<f64>() / n,
                avg_max_drawdown: members.iter().map(|r| r.max_drawdown).sum::<f64>() / n,
            }
        })
        .collect();

    sectors.sort_by(|a, b| {
        b.avg_annualized_return
            .partial_cmp(&a.avg_annualized_return)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    sectors
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series_from_closes(closes: &[f64]) -> Vec<PricePoint> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64);
                PricePoint::new(date, close, close, close, close, 100)
            })
            .collect()
    }

    #[test]
    fn test_total_return_matches_first_and_last() {
        let series = series_from_closes(&[100.0, 110.0, 90.0, 120.0]);
        let metrics = compute_series_metrics(&series).unwrap();

        assert!((metrics.total_return - 0.20).abs() < 1e-12);
        assert_eq!(metrics.first_price, 100.0);
        assert_eq!(metrics.last_price, 120.0);
    }

    #[test]
    fn test_max_drawdown_spec_example() {
        // [100, 110, 90, 120]: worst peak-to-trough is 90/110 - 1
        let series = series_from_closes(&[100.0, 110.0, 90.0, 120.0]);
        let metrics = compute_series_metrics(&series).unwrap();

        let expected = 90.0 / 110.0 - 1.0;
        assert!((metrics.max_drawdown - expected).abs() < 1e-12);
        assert!((metrics.max_drawdown - (-0.1818)).abs() < 1e-4);
    }

    #[test]
    fn test_max_drawdown_zero_for_non_decreasing() {
        let series = series_from_closes(&[100.0, 100.0, 105.0, 105.0, 130.0]);
        let metrics = compute_series_metrics(&series).unwrap();
        assert_eq!(metrics.max_drawdown, 0.0);
    }

    #[test]
    fn test_max_drawdown_never_positive() {
        let series = series_from_closes(&[50.0, 75.0, 60.0, 90.0, 20.0, 95.0]);
        let metrics = compute_series_metrics(&series).unwrap();
        assert!(metrics.max_drawdown <= 0.0);
    }

    #[test]
    fn test_annualized_equals_total_over_one_year() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let series = vec![
            PricePoint::new(start, 100.0, 100.0, 100.0, 100.0, 10),
            PricePoint::new(
                start + chrono::Duration::days(365),
                112.0,
                112.0,
                112.0,
                112.0,
                10,
            ),
        ];

        let metrics = compute_series_metrics(&series).unwrap();
        assert_eq!(metrics.span_days, 365);
        assert!((metrics.annualized_return - metrics.total_return).abs() < 1e-12);
    }

    #[test]
    fn test_sharpe_zero_when_volatility_zero() {
        // Flat series: every daily return is 0
        let series = series_from_closes(&[100.0, 100.0, 100.0, 100.0]);
        let metrics = compute_series_metrics(&series).unwrap();

        assert_eq!(metrics.volatility, 0.0);
        assert_eq!(metrics.sharpe_ratio, 0.0);
        assert!(metrics.sharpe_ratio.is_finite());
    }

    #[test]
    fn test_too_short_series_rejected() {
        assert!(compute_series_metrics(&series_from_closes(&[100.0])).is_none());
        assert!(compute_series_metrics(&[]).is_none());
    }

    #[test]
    fn test_volatility_is_sample_std_dev_annualized() {
        // Returns: +10%, -10%; sample std dev = sqrt(2 * 0.01) ... computed below
        let series = series_from_closes(&[100.0, 110.0, 99.0]);
        let metrics = compute_series_metrics(&series).unwrap();

        let r1: f64 = 0.10;
        let r2: f64 = 99.0 / 110.0 - 1.0;
        let mean = (r1 + r2) / 2.0;
        let expected = (((r1 - mean).powi(2) + (r2 - mean).powi(2)) / 1.0).sqrt() * 252.0_f64.sqrt();

        assert!((metrics.volatility - expected).abs() < 1e-12);
    }

    fn record(sector: &str, total: f64, annualized: f64) -> MetricsRecord {
        MetricsRecord {
            ticker: "X".to_string(),
            name: "X".to_string(),
            sector: sector.to_string(),
            first_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            last_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            span_days: 152,
            first_price: 100.0,
            last_price: 100.0 * (1.0 + total),
            total_return: total,
            annualized_return: annualized,
            volatility: 0.1,
            sharpe_ratio: annualized / 0.1,
            max_drawdown: -0.05,
            dividend_yield: None,
        }
    }

    #[test]
    fn test_sector_averages_are_arithmetic_means() {
        let records = vec![
            record("Banque", 0.10, 0.08),
            record("Banque", 0.30, 0.12),
            record("Transport", 0.05, 0.02),
        ];

        let sectors = sector_averages(&records);
        assert_eq!(sectors.len(), 2);

        let banque = sectors.iter().find(|s| s.sector == "Banque").unwrap();
        assert_eq!(banque.count, 2);
        assert!((banque.avg_total_return - 0.20).abs() < 1e-12);
        assert!((banque.avg_annualized_return - 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_build_records_skips_missing_and_errors_when_empty() {
        let manifest = vec![SecurityInfo {
            ticker: "SNTS".to_string(),
            name: "Sonatel".to_string(),
            sector: "Services publics".to_string(),
            last_price: 0.0,
            dividend: None,
        }];

        let empty: MarketData = HashMap::new();
        assert!(matches!(build_records(&manifest, &empty), Err(Error::NoData(_))));
    }

    #[test]
    fn test_build_records_dividend_yield() {
        let manifest = vec![SecurityInfo {
            ticker: "SNTS".to_string(),
            name: "Sonatel".to_string(),
            sector: "Services publics".to_string(),
            last_price: 120.0,
            dividend: Some(6.0),
        }];

        let mut data: MarketData = HashMap::new();
        data.insert(
            "SNTS".to_string(),
            series_from_closes(&[100.0, 110.0, 120.0]),
        );

        let records = build_records(&manifest, &data).unwrap();
        assert_eq!(records.len(), 1);
        let yield_ = records[0].dividend_yield.unwrap();
        assert!((yield_ - 0.05).abs() < 1e-12);
    }
}
