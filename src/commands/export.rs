use crate::commands::analyze;
use crate::error::Error;
use crate::export;
use crate::models::{MarketData, MetricsRecord, SectorMetrics};
use crate::utils::{get_dashboard_dir, get_exports_dir, get_reports_dir};

/// Which exporters to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    All,
    Excel,
    Pdf,
    Html,
}

impl ExportFormat {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "all" => Ok(ExportFormat::All),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "pdf" => Ok(ExportFormat::Pdf),
            "html" | "dashboard" => Ok(ExportFormat::Html),
            _ => Err(format!(
                "Invalid format: {}. Valid options: all, excel, pdf, html",
                s
            )),
        }
    }
}

pub fn run(format: String) {
    let format = match ExportFormat::parse(&format) {
        Ok(format) => format,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    match export_all(format) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("❌ Export failed: {}", e);
            std::process::exit(1);
        }
    }
}

pub(crate) fn export_all(format: ExportFormat) -> Result<(), Error> {
    let (manifest, data) = analyze::load_inputs()?;
    let records = crate::services::analytics::build_records(&manifest, &data)?;
    let sectors = crate::services::analytics::sector_averages(&records);

    render(format, &records, &sectors, &data)
}

pub(crate) fn render(
    format: ExportFormat,
    records: &[MetricsRecord],
    sectors: &[SectorMetrics],
    data: &MarketData,
) -> Result<(), Error> {
    if matches!(format, ExportFormat::All | ExportFormat::Excel) {
        let path = export::export_excel(records, sectors, data, &get_exports_dir())?;
        println!("📗 Spreadsheet written: {}", path.display());
    }

    if matches!(format, ExportFormat::All | ExportFormat::Pdf) {
        let path = export::export_pdf(records, sectors, data, &get_reports_dir())?;
        println!("📕 PDF report written: {}", path.display());
    }

    if matches!(format, ExportFormat::All | ExportFormat::Html) {
        let path = export::export_html(records, sectors, &get_dashboard_dir())?;
        println!("🌐 Dashboard written: {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!(ExportFormat::parse("all").unwrap(), ExportFormat::All);
        assert_eq!(ExportFormat::parse("XLSX").unwrap(), ExportFormat::Excel);
        assert_eq!(ExportFormat::parse("dashboard").unwrap(), ExportFormat::Html);
        assert!(ExportFormat::parse("docx").is_err());
    }
}
