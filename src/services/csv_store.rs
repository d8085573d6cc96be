use chrono::NaiveDate;
use csv::{Reader, Writer};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::MANIFEST_FILE;
use crate::error::{Error, Result};
use crate::models::{MarketData, PricePoint, SecurityInfo};
use crate::utils::sanitize_ticker;

const PRICE_HEADER: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];
const MANIFEST_HEADER: [&str; 5] = ["ticker", "name", "sector", "last_price", "dividend"];

/// Write one security's price history to `<data_dir>/<TICKER>.csv`
///
/// The file is fully overwritten; rows are written date-ascending with a
/// fixed header, so identical input produces byte-identical output.
pub fn write_series(data_dir: &Path, ticker: &str, series: &[PricePoint]) -> Result<PathBuf> {
    fs::create_dir_all(data_dir)?;

    let path = data_dir.join(format!("{}.csv", sanitize_ticker(ticker)));
    let mut writer = Writer::from_path(&path)?;

    writer.write_record(PRICE_HEADER)?;
    for point in series {
        writer.write_record(&[
            point.date.format("%Y-%m-%d").to_string(),
            point.open.to_string(),
            point.high.to_string(),
            point.low.to_string(),
            point.close.to_string(),
            point.volume.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(path)
}

/// Read one price history CSV, sorted by date
pub fn read_series(path: &Path) -> Result<Vec<PricePoint>> {
    let mut reader = Reader::from_path(path)
        .map_err(|e| Error::Io(format!("Failed to read {}: {}", path.display(), e)))?;

    let mut series = Vec::new();
    for result in reader.records() {
        let record =
            result.map_err(|e| Error::Io(format!("CSV parse error in {}: {}", path.display(), e)))?;

        if record.len() != PRICE_HEADER.len() {
            return Err(Error::Parse(format!(
                "Invalid CSV format in {}: expected {} fields, got {}",
                path.display(),
                PRICE_HEADER.len(),
                record.len()
            )));
        }

        let date_str = record.get(0).unwrap_or("");
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .map_err(|e| Error::Parse(format!("Invalid date '{}' in {}: {}", date_str, path.display(), e)))?;

        let open = parse_field(&record, 1, path)?;
        let high = parse_field(&record, 2, path)?;
        let low = parse_field(&record, 3, path)?;
        let close = parse_field(&record, 4, path)?;
        let volume: u64 = record
            .get(5)
            .unwrap_or("0")
            .parse()
            .map_err(|e| Error::Parse(format!("Invalid volume in {}: {}", path.display(), e)))?;

        series.push(PricePoint::new(date, open, high, low, close, volume));
    }

    series.sort_by_key(|p| p.date);
    Ok(series)
}

fn parse_field(record: &csv::StringRecord, idx: usize, path: &Path) -> Result<f64> {
    record
        .get(idx)
        .unwrap_or("")
        .parse()
        .map_err(|e| Error::Parse(format!("Invalid number in {}: {}", path.display(), e)))
}

/// Load every price history CSV in the data directory
///
/// The manifest file is skipped; an unreadable file is logged and
/// skipped so one corrupt series does not sink the whole run.
pub fn load_all_series(data_dir: &Path) -> Result<MarketData> {
    let entries = fs::read_dir(data_dir)
        .map_err(|e| Error::Io(format!("Failed to read {}: {}", data_dir.display(), e)))?;

    let mut data: MarketData = HashMap::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::Io(format!("Failed to read directory entry: {}", e)))?;
        let path = entry.path();

        if path.extension().and_then(|e| e.to_str()) != Some("csv") {
            continue;
        }
        let stem = match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => stem.to_string(),
            None => continue,
        };
        if path.file_name().and_then(|n| n.to_str()) == Some(MANIFEST_FILE) {
            continue;
        }

        match read_series(&path) {
            Ok(series) if !series.is_empty() => {
                data.insert(stem, series);
            }
            Ok(_) => {
                tracing::warn!("Empty price file skipped: {}", path.display());
            }
            Err(e) => {
                tracing::warn!("Unreadable price file skipped: {}: {}", path.display(), e);
            }
        }
    }

    Ok(data)
}

/// Write the manifest (`securities.csv`), sorted by ticker for stable
/// output across runs
pub fn write_manifest(data_dir: &Path, securities: &[SecurityInfo]) -> Result<PathBuf> {
    fs::create_dir_all(data_dir)?;

    let mut sorted: Vec<&SecurityInfo> = securities.iter().collect();
    sorted.sort_by(|a, b| a.ticker.cmp(&b.ticker));

    let path = data_dir.join(MANIFEST_FILE);
    let mut writer = Writer::from_path(&path)?;

    writer.write_record(MANIFEST_HEADER)?;
    for info in sorted {
        writer.write_record(&[
            info.ticker.clone(),
            info.name.clone(),
            info.sector.clone(),
            info.last_price.to_string(),
            info.dividend.map_or(String::new(), |d| d.to_string()),
        ])?;
    }

    writer.flush()?;
    Ok(path)
}

/// Read the manifest back
pub fn read_manifest(data_dir: &Path) -> Result<Vec<SecurityInfo>> {
    let path = data_dir.join(MANIFEST_FILE);
    if !path.exists() {
        return Err(Error::NotFound(format!(
            "manifest {} not found, run the collector first",
            path.display()
        )));
    }

    let mut reader = Reader::from_path(&path)
        .map_err(|e| Error::Io(format!("Failed to read {}: {}", path.display(), e)))?;

    let mut securities = Vec::new();
    for result in reader.records() {
        let record =
            result.map_err(|e| Error::Io(format!("CSV parse error in {}: {}", path.display(), e)))?;

        if record.len() != MANIFEST_HEADER.len() {
            return Err(Error::Parse(format!(
                "Invalid manifest format in {}: expected {} fields, got {}",
                path.display(),
                MANIFEST_HEADER.len(),
                record.len()
            )));
        }

        let dividend = match record.get(4).unwrap_or("") {
            "" => None,
            raw => Some(raw.parse().map_err(|e| {
                Error::Parse(format!("Invalid dividend in {}: {}", path.display(), e))
            })?),
        };

        securities.push(SecurityInfo {
            ticker: record.get(0).unwrap_or("").to_string(),
            name: record.get(1).unwrap_or("").to_string(),
            sector: record.get(2).unwrap_or("").to_string(),
            last_price: parse_field(&record, 3, &path)?,
            dividend,
        });
    }

    Ok(securities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_series() -> Vec<PricePoint> {
        vec![
            PricePoint::new(
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                100.0,
                101.5,
                99.0,
                100.5,
                1200,
            ),
            PricePoint::new(
                NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                100.5,
                102.0,
                100.0,
                101.0,
                800,
            ),
        ]
    }

    #[test]
    fn test_write_then_read_series() {
        let dir = TempDir::new().unwrap();
        let series = sample_series();

        let path = write_series(dir.path(), "SNTS", &series).unwrap();
        let loaded = read_series(&path).unwrap();

        assert_eq!(loaded, series);
    }

    #[test]
    fn test_write_series_is_byte_idempotent() {
        let dir = TempDir::new().unwrap();
        let series = sample_series();

        let path = write_series(dir.path(), "SNTS", &series).unwrap();
        let first = fs::read(&path).unwrap();

        let path = write_series(dir.path(), "SNTS", &series).unwrap();
        let second = fs::read(&path).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_read_series_rejects_bad_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("BAD.csv");
        fs::write(&path, "date,open,high,low,close,volume\nnot-a-date,1,2,3,4,5\n").unwrap();

        assert!(read_series(&path).is_err());
    }

    #[test]
    fn test_manifest_round_trip_sorted() {
        let dir = TempDir::new().unwrap();
        let securities = vec![
            SecurityInfo {
                ticker: "SNTS".to_string(),
                name: "Sonatel".to_string(),
                sector: "Services publics".to_string(),
                last_price: 22500.0,
                dividend: Some(1488.0),
            },
            SecurityInfo {
                ticker: "BOAC".to_string(),
                name: "BOA Côte d'Ivoire".to_string(),
                sector: "Banque".to_string(),
                last_price: 5800.0,
                dividend: None,
            },
        ];

        write_manifest(dir.path(), &securities).unwrap();
        let loaded = read_manifest(dir.path()).unwrap();

        assert_eq!(loaded.len(), 2);
        // Sorted by ticker on write
        assert_eq!(loaded[0].ticker, "BOAC");
        assert!(loaded[0].dividend.is_none());
        assert_eq!(loaded[1].dividend, Some(1488.0));
    }

    #[test]
    fn test_load_all_series_skips_manifest() {
        let dir = TempDir::new().unwrap();
        write_series(dir.path(), "SNTS", &sample_series()).unwrap();
        write_manifest(
            dir.path(),
            &[SecurityInfo {
                ticker: "SNTS".to_string(),
                name: "Sonatel".to_string(),
                sector: "Autres".to_string(),
                last_price: 0.0,
                dividend: None,
            }],
        )
        .unwrap();

        let data = load_all_series(dir.path()).unwrap();
        assert_eq!(data.len(), 1);
        assert!(data.contains_key("SNTS"));
    }
}
