use scraper::{Html, Selector};

use crate::constants::{BRVM_HISTORY_URL, BRVM_LISTING_URL};
use crate::error::{Error, Result};
use crate::models::{normalize_series, Listing, PricePoint};
use crate::services::http::HttpSession;
use crate::utils::{parse_flexible_date, parse_french_number};

/// BRVM official site client, used as fallback when Sika Finance has no
/// data for a security. The official pages use French number formatting
/// throughout (decimal commas, space thousands separators).
pub struct BrvmClient {
    session: HttpSession,
}

impl BrvmClient {
    pub fn new(session: HttpSession) -> Self {
        Self { session }
    }

    /// Fetch the listing from the official quotation page
    ///
    /// Only symbol and name are available here; sector classification
    /// falls back to the built-in map.
    pub async fn fetch_listing(&self) -> Result<Vec<Listing>> {
        let body = self.session.get_text(BRVM_LISTING_URL).await?;
        let listings = parse_listing_table(&body)?;

        if listings.is_empty() {
            return Err(Error::NoData("official quotation table empty or not found".to_string()));
        }

        tracing::info!("Fetched {} listed securities from brvm.org", listings.len());
        Ok(listings)
    }

    /// Fetch the daily price history of one security from the official
    /// historical page
    pub async fn fetch_history(
        &self,
        ticker: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<PricePoint>> {
        let url = format!(
            "{}/{}?start={}&end={}",
            BRVM_HISTORY_URL, ticker, start_date, end_date
        );
        let body = self.session.get_text(&url).await?;
        let series = parse_history_table(&body)?;

        if series.is_empty() {
            return Err(Error::NoData(format!("no official history rows for {}", ticker)));
        }

        Ok(normalize_series(series))
    }
}

fn parse_listing_table(body: &str) -> Result<Vec<Listing>> {
    let document = Html::parse_document(body);
    let table_sel = selector("table.table")?;
    let row_sel = selector("tbody tr")?;
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

        if cells.len() < 2 || cells[0].is_empty() {
            continue;
        }

        listings.push(Listing {
            ticker: cells[0].clone(),
            name: cells[1].clone(),
            sector: None,
            last_price: cells
                .get(2)
                .and_then(|c| parse_french_number(c))
                .unwrap_or(0.0),
        });
    }

    Ok(listings)
}

fn parse_history_table(body: &str) -> Result<Vec<PricePoint>> {
    let document = Html::parse_document(body);
    let table_sel = selector("table.table")?;
    let row_sel = selector("tbody tr")?;
    let cell_sel = selector("td")?;

    let table = match document.select(&table_sel).next() {
        Some(table) => table,
        None => return Ok(Vec::new()),
    };

    let mut series = Vec::new();
    for row in table.select(&row_sel) {
        let cells: Vec<String> = row
            .select(&cell_sel)
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .collect();

        // date, open, high, low, close, volume
        if cells.len() < 6 {
            continue;
        }

        let date = match parse_flexible_date(&cells[0]) {
            Some(date) => date,
            None => continue,
        };
        let open = parse_french_number(&cells[1]);
        let high = parse_french_number(&cells[2]);
        let low = parse_french_number(&cells[3]);
        let close = parse_french_number(&cells[4]);

        let (open, high, low, close) = match (open, high, low, close) {
            (Some(o), Some(h), Some(l), Some(c)) => (o, h, l, c),
            _ => continue,
        };

        let volume = parse_french_number(&cells[5])
            .map(|v| v.max(0.0) as u64)
            .unwrap_or(0);

        series.push(PricePoint::new(date, open, high, low, close, volume));
    }

    Ok(series)
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Parse(format!("bad selector {}: {}", css, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_history_table() {
        let html = r#"
        <html><body>
        <table class="table">
          <thead><tr><th>Date</th><th>Ouverture</th><th>Plus haut</th><th>Plus bas</th><th>Clôture</th><th>Volume</th></tr></thead>
          <tbody>
            <tr><td>03/05/2024</td><td>22 000</td><td>22 600,5</td><td>21 900</td><td>22 500</td><td>1 200</td></tr>
            <tr><td>02/05/2024</td><td>21 800</td><td>22 100</td><td>21 700</td><td>22 000</td><td>950</td></tr>
            <tr><td>mauvaise ligne</td><td></td><td></td><td></td><td></td><td></td></tr>
          </tbody>
        </table>
        </body></html>"#;

        let series = parse_history_table(html).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, NaiveDate::from_ymd_opt(2024, 5, 3).unwrap());
        assert_eq!(series[0].high, 22600.5);
        assert_eq!(series[1].volume, 950);
    }

    #[test]
    fn test_parse_listing_table() {
        let html = r#"
        <table class="table">
          <tbody>
            <tr><td>SNTS</td><td>Sonatel</td><td>22 500</td></tr>
            <tr><td>SGBC</td><td>SGB CI</td></tr>
          </tbody>
        </table>"#;

        let listings = parse_listing_table(html).unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].last_price, 22500.0);
        assert_eq!(listings[1].last_price, 0.0);
    }
}
