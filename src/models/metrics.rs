use chrono::NaiveDate;
use serde::Serialize;

/// Performance metrics for one security, recomputed in full from its
/// price history on every run. Return-like fields are fractions
/// (0.20 = +20%); exporters format them as percentages.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsRecord {
    pub ticker: String,
    pub name: String,
    pub sector: String,

    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    /// Calendar days between first and last observation
    pub span_days: i64,

    pub first_price: f64,
    pub last_price: f64,

    /// last/first - 1
    pub total_return: f64,

    /// (1 + total_return)^(365/span_days) - 1
    pub annualized_return: f64,

    /// Sample std-dev of daily returns, annualized by sqrt(252)
    pub volatility: f64,

    /// annualized_return / volatility, 0 when volatility is 0
    pub sharpe_ratio: f64,

    /// min(price / running-max - 1), always <= 0
    pub max_drawdown: f64,

    /// latest dividend / last close, when dividend data is available
    pub dividend_yield: Option<f64>,
}

/// Arithmetic means of the per-security metrics within one sector
#[derive(Debug, Clone, Serialize)]
pub struct SectorMetrics {
    pub sector: String,
    /// Number of securities contributing to the averages
    pub count: usize,
    pub avg_total_return: f64,
    pub avg_annualized_return: f64,
    pub avg_volatility: f64,
    pub avg_sharpe_ratio: f64,
    pub avg_max_drawdown: f64,
}
