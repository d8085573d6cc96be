use crate::error::Error;
use crate::models::{MarketData, MetricsRecord, SectorMetrics, SecurityInfo};
use crate::services::{analytics, csv_store};
use crate::utils::get_data_dir;

pub fn run() {
    match analyze() {
        Ok((records, sectors)) => {
            print_records(&records);
            print_sectors(&sectors);
        }
        Err(e) => {
            eprintln!("❌ Analysis failed: {}", e);
            std::process::exit(1);
        }
    }
}

/// Load manifest + CSVs from the data directory and compute everything
pub(crate) fn analyze() -> Result<(Vec<MetricsRecord>, Vec<SectorMetrics>), Error> {
    let (manifest, data) = load_inputs()?;
    let records = analytics::build_records(&manifest, &data)?;
    let sectors = analytics::sector_averages(&records);
    Ok((records, sectors))
}

pub(crate) fn load_inputs() -> Result<(Vec<SecurityInfo>, MarketData), Error> {
    let data_dir = get_data_dir();
    let manifest = csv_store::read_manifest(&data_dir)?;
    let data = csv_store::load_all_series(&data_dir)?;

    if data.is_empty() {
        return Err(Error::NoData(format!(
            "no price history found in {}",
            data_dir.display()
        )));
    }

    Ok((manifest, data))
}

fn print_records(records: &[MetricsRecord]) {
    println!("📊 Performance des valeurs ({} titres)\n", records.len());
    println!(
        "{:<12} {:<18} {:>10} {:>10} {:>10} {:>8} {:>10} {:>8}",
        "Symbole", "Secteur", "Perf.", "Ann.", "Volat.", "Sharpe", "DD max", "Div."
    );

    for record in records {
        println!(
            "{:<12} {:<18} {:>9.1}% {:>9.1}% {:>9.1}% {:>8.2} {:>9.1}% {:>8}",
            record.ticker,
            truncate(&record.sector, 18),
            record.total_return * 100.0,
            record.annualized_return * 100.0,
            record.volatility * 100.0,
            record.sharpe_ratio,
            record.max_drawdown * 100.0,
            record
                .dividend_yield
                .map_or("-".to_string(), |y| format!("{:.1}%", y * 100.0)),
        );
    }
}

fn print_sectors(sectors: &[SectorMetrics]) {
    println!("\n🏦 Moyennes par secteur\n");
    println!(
        "{:<20} {:>8} {:>10} {:>10} {:>10}",
        "Secteur", "Valeurs", "Perf.", "Ann.", "Volat."
    );

    for sector in sectors {
        println!(
            "{:<20} {:>8} {:>9.1}% {:>9.1}% {:>9.1}%",
            truncate(&sector.sector, 20),
            sector.count,
            sector.avg_total_return * 100.0,
            sector.avg_annualized_return * 100.0,
            sector.avg_volatility * 100.0,
        );
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
