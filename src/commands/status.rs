use std::fs;
use std::path::Path;

use crate::constants::MANIFEST_FILE;
use crate::services::csv_store;
use crate::utils::get_data_dir;

pub fn run() {
    println!("📊 BRVM Data Status\n");

    match show_status() {
        Ok(()) => {}
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn show_status() -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = get_data_dir();

    if !data_dir.exists() {
        println!("⚠️  No data directory found. Run 'fetch' first.");
        return Ok(());
    }

    let mut files: Vec<_> = fs::read_dir(&data_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension().and_then(|e| e.to_str()) == Some("csv")
                && p.file_name().and_then(|n| n.to_str()) != Some(MANIFEST_FILE)
        })
        .collect();
    files.sort();

    if files.is_empty() {
        println!("⚠️  No price files in {}. Run 'fetch' first.", data_dir.display());
        return Ok(());
    }

    println!("📈 {} price files in {}\n", files.len(), data_dir.display());

    for path in &files {
        show_file(path);
    }

    match csv_store::read_manifest(&data_dir) {
        Ok(manifest) => {
            let indices = manifest.iter().filter(|s| s.is_index()).count();
            let with_dividend = manifest.iter().filter(|s| s.dividend.is_some()).count();
            println!(
                "\n📋 Manifest: {} securities ({} indices), {} with dividend data",
                manifest.len(),
                indices,
                with_dividend
            );
        }
        Err(_) => {
            println!("\n⚠️  No manifest ({}) - sectors unknown", MANIFEST_FILE);
        }
    }

    Ok(())
}

fn show_file(path: &Path) {
    let ticker = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("?")
        .to_string();

    match csv_store::read_series(path) {
        Ok(series) if !series.is_empty() => {
            let first = series.first().map(|p| p.date.to_string()).unwrap_or_default();
            let last = series.last().map(|p| p.date.to_string()).unwrap_or_default();
            let close = series.last().map(|p| p.close).unwrap_or(0.0);
            println!(
                "🔹 {:<14} {:>6} records  ({} → {})  dernier cours: {:.0}",
                ticker,
                series.len(),
                first,
                last,
                close
            );
        }
        Ok(_) => {
            println!("⚠️  {:<14} empty file", ticker);
        }
        Err(e) => {
            println!("❌ {:<14} unreadable: {}", ticker, e);
        }
    }
}
