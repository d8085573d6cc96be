use chrono::Local;
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::{MarketData, MetricsRecord, SectorMetrics};
use crate::utils::sanitize_ticker;

/// Export the metrics table and the raw price histories to a workbook:
/// a summary sheet, one sheet per security, and a sector sheet.
pub fn export_excel(
    records: &[MetricsRecord],
    sectors: &[SectorMetrics],
    data: &MarketData,
    exports_dir: &Path,
) -> Result<PathBuf> {
    fs::create_dir_all(exports_dir)?;
    let path = exports_dir.join(format!(
        "brvm_analysis_{}.xlsx",
        Local::now().format("%Y%m%d")
    ));

    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x00D7E4BC))
        .set_border(FormatBorder::Thin);
    let pct_format = Format::new().set_num_format("0.00%");
    let num_format = Format::new().set_num_format("#,##0.00");

    // 1. Summary sheet, ranked by total return
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Résumé")?;

        let headers = [
            "Symbole",
            "Nom",
            "Secteur",
            "Prix initial",
            "Prix final",
            "Performance totale",
            "Performance annualisée",
            "Volatilité",
            "Ratio de Sharpe",
            "Drawdown max",
            "Rendement dividende",
        ];
        for (col, title) in headers.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *title, &header_format)?;
        }

        for (i, record) in records.iter().enumerate() {
            let row = (i + 1) as u32;
            sheet.write_string(row, 0, &record.ticker)?;
            sheet.write_string(row, 1, &record.name)?;
            sheet.write_string(row, 2, &record.sector)?;
            sheet.write_number_with_format(row, 3, record.first_price, &num_format)?;
            sheet.write_number_with_format(row, 4, record.last_price, &num_format)?;
            sheet.write_number_with_format(row, 5, record.total_return, &pct_format)?;
            sheet.write_number_with_format(row, 6, record.annualized_return, &pct_format)?;
            sheet.write_number_with_format(row, 7, record.volatility, &pct_format)?;
            sheet.write_number_with_format(row, 8, record.sharpe_ratio, &num_format)?;
            sheet.write_number_with_format(row, 9, record.max_drawdown, &pct_format)?;
            match record.dividend_yield {
                Some(yield_) => {
                    sheet.write_number_with_format(row, 10, yield_, &pct_format)?;
                }
                None => {
                    sheet.write_string(row, 10, "-")?;
                }
            }
        }

        sheet.set_column_width(0, 12)?;
        sheet.set_column_width(1, 30)?;
        sheet.set_column_width(2, 18)?;
        for col in 3..=10u16 {
            sheet.set_column_width(col, 16)?;
        }
    }

    // 2. One sheet per security with its full history
    for record in records {
        let sheet = workbook.add_worksheet();
        sheet.set_name(sheet_name(&record.ticker))?;

        let headers = ["Date", "Ouverture", "Plus haut", "Plus bas", "Clôture", "Volume"];
        for (col, title) in headers.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *title, &header_format)?;
        }

        if let Some(series) = data.get(&sanitize_ticker(&record.ticker)) {
            for (i, point) in series.iter().enumerate() {
                let row = (i + 1) as u32;
                sheet.write_string(row, 0, point.date.format("%Y-%m-%d").to_string())?;
                sheet.write_number_with_format(row, 1, point.open, &num_format)?;
                sheet.write_number_with_format(row, 2, point.high, &num_format)?;
                sheet.write_number_with_format(row, 3, point.low, &num_format)?;
                sheet.write_number_with_format(row, 4, point.close, &num_format)?;
                sheet.write_number(row, 5, point.volume as f64)?;
            }
        }

        sheet.set_column_width(0, 12)?;
        for col in 1..=4u16 {
            sheet.set_column_width(col, 11)?;
        }
        sheet.set_column_width(5, 13)?;
    }

    // 3. Sector averages
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Analyse Sectorielle")?;

        let headers = [
            "Secteur",
            "Valeurs",
            "Performance totale moyenne",
            "Performance annualisée moyenne",
            "Volatilité moyenne",
            "Ratio de Sharpe moyen",
            "Drawdown max moyen",
        ];
        for (col, title) in headers.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *title, &header_format)?;
        }

        for (i, sector) in sectors.iter().enumerate() {
            let row = (i + 1) as u32;
            sheet.write_string(row, 0, &sector.sector)?;
            sheet.write_number(row, 1, sector.count as f64)?;
            sheet.write_number_with_format(row, 2, sector.avg_total_return, &pct_format)?;
            sheet.write_number_with_format(row, 3, sector.avg_annualized_return, &pct_format)?;
            sheet.write_number_with_format(row, 4, sector.avg_volatility, &pct_format)?;
            sheet.write_number_with_format(row, 5, sector.avg_sharpe_ratio, &num_format)?;
            sheet.write_number_with_format(row, 6, sector.avg_max_drawdown, &pct_format)?;
        }

        sheet.set_column_width(0, 18)?;
        for col in 1..=6u16 {
            sheet.set_column_width(col, 26)?;
        }
    }

    workbook.save(&path)?;
    Ok(path)
}

/// Excel sheet names are capped at 31 chars and reject a few symbols
fn sheet_name(ticker: &str) -> String {
    let cleaned: String = ticker
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '-',
            other => other,
        })
        .collect();
    cleaned.chars().take(20).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_name_sanitized_and_truncated() {
        assert_eq!(sheet_name("SNTS"), "SNTS");
        assert_eq!(sheet_name("BRVM-C/I"), "BRVM-C-I");
        assert_eq!(sheet_name("ABCDEFGHIJKLMNOPQRSTUVWXYZ"), "ABCDEFGHIJKLMNOPQRST");
    }
}
