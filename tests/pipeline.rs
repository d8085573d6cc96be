//! Offline pipeline test: seed the data directory with CSVs, then run
//! metrics computation, every exporter and the publisher no-op path.

use chrono::NaiveDate;
use std::fs;
use tempfile::TempDir;

use brvm_analysis::export;
use brvm_analysis::models::{PricePoint, SecurityInfo};
use brvm_analysis::services::publisher::{self, PublishOutcome};
use brvm_analysis::services::{analytics, csv_store};

fn series(start: (i32, u32, u32), closes: &[f64]) -> Vec<PricePoint> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let date = NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap()
                + chrono::Duration::days(i as i64);
            PricePoint::new(date, close, close * 1.01, close * 0.99, close, 500)
        })
        .collect()
}

fn seed_data(dir: &TempDir) -> Vec<SecurityInfo> {
    let snts = series((2023, 1, 2), &[20000.0, 20500.0, 19800.0, 22500.0]);
    let sgbc = series((2023, 1, 2), &[15000.0, 14800.0, 15100.0, 15600.0]);
    let index = series((2023, 1, 2), &[220.0, 221.5, 219.0, 228.0]);

    csv_store::write_series(dir.path(), "SNTS", &snts).unwrap();
    csv_store::write_series(dir.path(), "SGBC", &sgbc).unwrap();
    csv_store::write_series(dir.path(), "BRVM-Composite", &index).unwrap();

    let manifest = vec![
        SecurityInfo {
            ticker: "SNTS".to_string(),
            name: "Sonatel".to_string(),
            sector: "Services publics".to_string(),
            last_price: 22500.0,
            dividend: Some(1125.0),
        },
        SecurityInfo {
            ticker: "SGBC".to_string(),
            name: "SGB Côte d'Ivoire".to_string(),
            sector: "Banque".to_string(),
            last_price: 15600.0,
            dividend: None,
        },
        SecurityInfo {
            ticker: "BRVM-Composite".to_string(),
            name: "BRVM-Composite".to_string(),
            sector: "Indice".to_string(),
            last_price: 228.0,
            dividend: None,
        },
    ];
    csv_store::write_manifest(dir.path(), &manifest).unwrap();
    manifest
}

#[test]
fn metrics_flow_from_disk() {
    let data_dir = TempDir::new().unwrap();
    let manifest = seed_data(&data_dir);

    let data = csv_store::load_all_series(data_dir.path()).unwrap();
    assert_eq!(data.len(), 3);

    let records = analytics::build_records(&manifest, &data).unwrap();
    assert_eq!(records.len(), 3);

    // Ranked by total return: SNTS (+12.5%) ahead of SGBC (+4%)
    assert_eq!(records[0].ticker, "SNTS");
    assert!((records[0].total_return - 0.125).abs() < 1e-12);
    assert!((records[0].dividend_yield.unwrap() - 0.05).abs() < 1e-12);

    let sectors = analytics::sector_averages(&records);
    assert_eq!(sectors.len(), 3);
    let banque = sectors.iter().find(|s| s.sector == "Banque").unwrap();
    assert_eq!(banque.count, 1);
}

#[test]
fn exporters_write_their_artifacts() {
    let data_dir = TempDir::new().unwrap();
    let manifest = seed_data(&data_dir);
    let data = csv_store::load_all_series(data_dir.path()).unwrap();
    let records = analytics::build_records(&manifest, &data).unwrap();
    let sectors = analytics::sector_averages(&records);

    let exports_dir = TempDir::new().unwrap();
    let excel = export::export_excel(&records, &sectors, &data, exports_dir.path()).unwrap();
    assert!(excel.exists());
    assert!(excel.extension().and_then(|e| e.to_str()) == Some("xlsx"));

    let reports_dir = TempDir::new().unwrap();
    let pdf = export::export_pdf(&records, &sectors, &data, reports_dir.path()).unwrap();
    assert!(pdf.exists());
    assert!(fs::metadata(&pdf).unwrap().len() > 0);

    let dashboard_dir = TempDir::new().unwrap();
    let html = export::export_html(&records, &sectors, dashboard_dir.path()).unwrap();
    let content = fs::read_to_string(&html).unwrap();
    assert!(content.contains("SNTS"));
    assert!(content.contains("Classement des valeurs de la BRVM"));
}

#[test]
fn publisher_noop_when_site_matches_dashboard() {
    let dashboard_dir = TempDir::new().unwrap();
    let site_dir = TempDir::new().unwrap();

    fs::write(dashboard_dir.path().join("index.html"), "<html>same</html>").unwrap();
    fs::write(site_dir.path().join("index.html"), "<html>same</html>").unwrap();

    let outcome = publisher::publish(dashboard_dir.path(), site_dir.path()).unwrap();
    assert_eq!(outcome, PublishOutcome::Unchanged);
}

#[test]
fn collector_output_is_idempotent() {
    let data_dir = TempDir::new().unwrap();
    let snts = series((2023, 1, 2), &[20000.0, 20500.0, 19800.0, 22500.0]);

    let path = csv_store::write_series(data_dir.path(), "SNTS", &snts).unwrap();
    let first = fs::read(&path).unwrap();
    csv_store::write_series(data_dir.path(), "SNTS", &snts).unwrap();
    let second = fs::read(&path).unwrap();

    assert_eq!(first, second);
}
