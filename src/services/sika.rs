use scraper::{Html, Selector};
use serde_json::Value;

use crate::constants::{SIKA_COMPANY_URL, SIKA_HISTORY_URL, SIKA_LISTING_URL};
use crate::error::{Error, Result};
use crate::models::{normalize_series, Listing, PricePoint};
use crate::services::http::HttpSession;
use crate::utils::{parse_flexible_date, parse_french_number};

/// Sika Finance client: listing page, historical prices API and
/// company pages (dividends). Primary data source of the collector.
pub struct SikaClient {
    session: HttpSession,
}

impl SikaClient {
    pub fn new(session: HttpSession) -> Self {
        Self { session }
    }

    /// Fetch the list of securities quoted on the BRVM
    ///
    /// Parses the quotation table: symbol, name, sector and last price
    /// columns. Rows that cannot be parsed are skipped with a warning.
    pub async fn fetch_listing(&self) -> Result<Vec<Listing>> {
        let body = self.session.get_text(SIKA_LISTING_URL).await?;
        let listings = parse_listing_table(&body)?;

        if listings.is_empty() {
            return Err(Error::NoData("quotation table empty or not found".to_string()));
        }

        tracing::info!("Fetched {} listed securities from Sika Finance", listings.len());
        Ok(listings)
    }

    /// Fetch the full daily price history of one security
    ///
    /// POSTs to the `GetHistorique` API; the response carries the rows
    /// under an `intraday` key with French column names.
    pub async fn fetch_history(
        &self,
        ticker: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<PricePoint>> {
        let payload = serde_json::json!({
            "ticker": ticker,
            "dateDebut": start_date,
            "dateFin": end_date,
        });

        let response = self.session.post_json(SIKA_HISTORY_URL, &payload).await?;

        let rows = response
            .get("intraday")
            .and_then(|v| v.as_array())
            .ok_or_else(|| Error::NoData(format!("no history rows for {}", ticker)))?;

        if rows.is_empty() {
            return Err(Error::NoData(format!("no history rows for {}", ticker)));
        }

        let mut series = Vec::with_capacity(rows.len());
        for row in rows {
            match parse_history_row(row) {
                Some(point) => series.push(point),
                None => {
                    tracing::warn!("Skipping unparsable history row for {}: {}", ticker, row);
                }
            }
        }

        if series.is_empty() {
            return Err(Error::NoData(format!("no parsable history rows for {}", ticker)));
        }

        Ok(normalize_series(series))
    }

    /// Fetch the latest declared dividend per share from the company page
    ///
    /// Scans tables mentioning dividends for rows of the form
    /// `<year> | <amount>` and returns the amount of the most recent
    /// year. Returns Ok(None) when the page has no dividend data.
    pub async fn fetch_latest_dividend(&self, ticker: &str) -> Result<Option<f64>> {
        let url = format!("{}/{}", SIKA_COMPANY_URL, ticker);
        let body = self.session.get_text(&url).await?;
        Ok(parse_latest_dividend(&body))
    }
}

fn parse_listing_table(body: &str) -> Result<Vec<Listing>> {
    let document = Html::parse_document(body);
    let table_sel = selector("table.table-cotation")?;
    let row_sel = selector("tr")?;
    let cell_sel = selector("td")?;

    let table = match document.select(&table_sel).next() {
        Some(table) => table,
        None => return Ok(Vec::new()),
    };

    let mut listings = Vec::new();
    for row in table.select(&row_sel) {
        let cells: Vec<String> = row
            .select(&cell_sel)
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .collect();

        // symbol, name, sector, last price, change, volume, ...
        if cells.len() < 4 {
            continue;
        }

        let ticker = cells[0].clone();
        if ticker.is_empty() {
            continue;
        }

        let sector = if cells[2].is_empty() {
            None
        } else {
            Some(cells[2].clone())
        };

        listings.push(Listing {
            ticker,
            name: cells[1].clone(),
            sector,
            last_price: parse_french_number(&cells[3]).unwrap_or(0.0),
        });
    }

    Ok(listings)
}

fn parse_history_row(row: &Value) -> Option<PricePoint> {
    let date = parse_flexible_date(row.get("date")?.as_str()?)?;

    let open = json_number(row.get("ouverture")?)?;
    let high = json_number(row.get("plus_haut")?)?;
    let low = json_number(row.get("plus_bas")?)?;
    let close = json_number(row.get("cloture")?)?;
    let volume = row
        .get("volume")
        .and_then(json_number)
        .map(|v| v.max(0.0) as u64)
        .unwrap_or(0);

    Some(PricePoint::new(date, open, high, low, close, volume))
}

/// Numbers in the API come either as JSON numbers or as strings with
/// French formatting
fn json_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_french_number(s),
        _ => None,
    }
}

fn parse_latest_dividend(body: &str) -> Option<f64> {
    let document = Html::parse_document(body);
    let table_sel = selector("table").ok()?;
    let row_sel = selector("tr").ok()?;
    let cell_sel = selector("td").ok()?;

    let mut latest: Option<(u32, f64)> = None;

    for table in document.select(&table_sel) {
        let table_text = table.text().collect::<String>();
        if !table_text.contains("Dividende") && !table_text.contains("DPA") {
            continue;
        }

        for row in table.select(&row_sel) {
            let cells: Vec<String> = row
                .select(&cell_sel)
                .map(|cell| cell.text().collect::<String>().trim().to_string())
                .collect();

            if cells.len() < 2 {
                continue;
            }

            let year = match extract_year(&cells[0]) {
                Some(year) => year,
                None => continue,
            };
            let amount = match parse_french_number(&cells[1]) {
                Some(amount) => amount,
                None => continue,
            };

            if latest.map_or(true, |(y, _)| year > y) {
                latest = Some((year, amount));
            }
        }
    }

    latest.map(|(_, amount)| amount)
}

/// First plausible 4-digit year in a header cell ("Div 2024" -> 2024)
fn extract_year(text: &str) -> Option<u32> {
    let digits: Vec<char> = text.chars().collect();
    for window in digits.windows(4) {
        if window.iter().all(|c| c.is_ascii_digit()) {
            let year: u32 = window.iter().collect::<String>().parse().ok()?;
            if (1990..=2100).contains(&year) {
                return Some(year);
            }
        }
    }
    None
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Parse(format!("bad selector {}: {}", css, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_listing_table() {
        let html = r#"
        <html><body>
        <table class="table-cotation">
          <tr><th>Symbole</th><th>Nom</th><th>Secteur</th><th>Cours</th></tr>
          <tr><td>SNTS</td><td>Sonatel</td><td>Télécommunications</td><td>22 500</td></tr>
          <tr><td>SGBC</td><td>SGB Côte d'Ivoire</td><td></td><td>17 000</td></tr>
          <tr><td></td><td>ligne vide</td><td></td><td></td></tr>
        </table>
        </body></html>"#;

        let listings = parse_listing_table(html).unwrap();
        assert_eq!(listings.len(), 2);

        assert_eq!(listings[0].ticker, "SNTS");
        assert_eq!(listings[0].name, "Sonatel");
        assert_eq!(listings[0].sector.as_deref(), Some("Télécommunications"));
        assert_eq!(listings[0].last_price, 22500.0);

        assert_eq!(listings[1].ticker, "SGBC");
        assert!(listings[1].sector.is_none());
    }

    #[test]
    fn test_parse_listing_table_missing() {
        let listings = parse_listing_table("<html><body><p>rien</p></body></html>").unwrap();
        assert!(listings.is_empty());
    }

    #[test]
    fn test_parse_history_row() {
        let row = serde_json::json!({
            "date": "2024-05-03T00:00:00",
            "ouverture": 22000.0,
            "plus_haut": "22 600",
            "plus_bas": 21900,
            "cloture": 22500.5,
            "volume": 1200
        });

        let point = parse_history_row(&row).unwrap();
        assert_eq!(point.date, NaiveDate::from_ymd_opt(2024, 5, 3).unwrap());
        assert_eq!(point.open, 22000.0);
        assert_eq!(point.high, 22600.0);
        assert_eq!(point.low, 21900.0);
        assert_eq!(point.close, 22500.5);
        assert_eq!(point.volume, 1200);
    }

    #[test]
    fn test_parse_history_row_rejects_bad_date() {
        let row = serde_json::json!({
            "date": "pas une date",
            "ouverture": 1.0, "plus_haut": 1.0, "plus_bas": 1.0, "cloture": 1.0, "volume": 0
        });
        assert!(parse_history_row(&row).is_none());
    }

    #[test]
    fn test_parse_latest_dividend() {
        let html = r#"
        <html><body>
        <table>
          <tr><th>Dividende par action</th></tr>
          <tr><td>Div 2022</td><td>310,5</td></tr>
          <tr><td>Div 2024</td><td>455</td></tr>
          <tr><td>Div 2023</td><td>-</td></tr>
        </table>
        </body></html>"#;

        assert_eq!(parse_latest_dividend(html), Some(455.0));
    }

    #[test]
    fn test_parse_latest_dividend_absent() {
        let html = "<html><body><table><tr><td>PER 2024</td><td>12</td></tr></table></body></html>";
        assert_eq!(parse_latest_dividend(html), None);
    }

    #[test]
    fn test_extract_year() {
        assert_eq!(extract_year("Div 2024"), Some(2024));
        assert_eq!(extract_year("2021"), Some(2021));
        assert_eq!(extract_year("Dividende"), None);
        assert_eq!(extract_year("0123"), None);
    }
}
