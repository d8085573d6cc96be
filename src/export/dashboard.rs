use chrono::{Datelike, Local};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::{MetricsRecord, SectorMetrics};

/// Render the dashboard and write it to `<dashboard_dir>/index.html`
pub fn export_html(
    records: &[MetricsRecord],
    sectors: &[SectorMetrics],
    dashboard_dir: &Path,
) -> Result<PathBuf> {
    let now = Local::now();
    let html = render_dashboard(records, sectors, &now.format("%d/%m/%Y").to_string(), now.year());

    fs::create_dir_all(dashboard_dir)?;
    let path = dashboard_dir.join("index.html");
    fs::write(&path, html)?;

    Ok(path)
}

/// Pure renderer: ranked metrics table, top performers and top dividend
/// yields, sector averages. Self-contained HTML with inline CSS.
pub fn render_dashboard(
    records: &[MetricsRecord],
    sectors: &[SectorMetrics],
    date: &str,
    year: i32,
) -> String {
    let mut page = String::new();

    let _ = write!(
        page,
        r#"<!DOCTYPE html>
<html lang="fr">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Classement des valeurs de la BRVM</title>
<style>
  body {{ font-family: Arial, sans-serif; margin: 0; padding: 20px; background-color: #f8f9fa; color: #212529; }}
  .container {{ max-width: 1400px; margin: 0 auto; }}
  .header {{ text-align: center; margin-bottom: 30px; }}
  h1, h2 {{ color: #0d6efd; }}
  .card {{ background-color: white; border-radius: 5px; box-shadow: 0 4px 6px rgba(0, 0, 0, 0.1); margin-bottom: 20px; padding: 15px; }}
  .table-container {{ overflow-x: auto; }}
  table {{ width: 100%; border-collapse: collapse; margin-bottom: 20px; }}
  th, td {{ padding: 10px 12px; text-align: left; border-bottom: 1px solid #ddd; }}
  th {{ background-color: #f8f9fa; color: #495057; font-weight: bold; }}
  tr:hover {{ background-color: #f8f9fa; }}
  .positive {{ color: #198754; }}
  .negative {{ color: #dc3545; }}
  .muted {{ color: #6c757d; }}
  .footer {{ text-align: center; margin-top: 30px; padding: 10px; color: #6c757d; }}
</style>
</head>
<body>
<div class="container">
  <div class="header">
    <h1>Classement des valeurs de la BRVM</h1>
    <p class="muted">Données extraites le {date}</p>
  </div>
"#,
        date = date
    );

    // Full ranked table
    page.push_str("  <div class=\"card\">\n    <h2>Classement par performance totale</h2>\n    <div class=\"table-container\">\n");
    page.push_str("      <table>\n        <tr><th>#</th><th>Symbole</th><th>Nom</th><th>Secteur</th><th>Dernier cours</th><th>Perf. totale</th><th>Perf. annualisée</th><th>Volatilité</th><th>Sharpe</th><th>Drawdown max</th><th>Rendement dividende</th></tr>\n");
    for (rank, record) in records.iter().enumerate() {
        let _ = write!(
            page,
            "        <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.1}%</td><td>{:.2}</td><td>{}</td><td>{}</td></tr>\n",
            rank + 1,
            escape(&record.ticker),
            escape(&record.name),
            escape(&record.sector),
            format_price(record.last_price),
            signed_pct(record.total_return),
            signed_pct(record.annualized_return),
            record.volatility * 100.0,
            record.sharpe_ratio,
            signed_pct(record.max_drawdown),
            record
                .dividend_yield
                .map_or("-".to_string(), |y| format!("{:.2}%", y * 100.0)),
        );
    }
    page.push_str("      </table>\n    </div>\n  </div>\n");

    // Top performers
    page.push_str("  <div class=\"card\">\n    <h2>Top 15 des performances annualisées</h2>\n");
    page.push_str("    <table>\n      <tr><th>Symbole</th><th>Secteur</th><th>Perf. annualisée</th><th>Sharpe</th></tr>\n");
    let mut by_annualized: Vec<&MetricsRecord> = records.iter().collect();
    by_annualized.sort_by(|a, b| {
        b.annualized_return
            .partial_cmp(&a.annualized_return)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for record in by_annualized.iter().take(15) {
        let _ = write!(
            page,
            "      <tr><td>{}</td><td>{}</td><td>{}</td><td>{:.2}</td></tr>\n",
            escape(&record.ticker),
            escape(&record.sector),
            signed_pct(record.annualized_return),
            record.sharpe_ratio,
        );
    }
    page.push_str("    </table>\n  </div>\n");

    // Top dividend yields
    let mut by_yield: Vec<&MetricsRecord> = records
        .iter()
        .filter(|r| r.dividend_yield.is_some())
        .collect();
    by_yield.sort_by(|a, b| {
        b.dividend_yield
            .partial_cmp(&a.dividend_yield)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    if !by_yield.is_empty() {
        page.push_str("  <div class=\"card\">\n    <h2>Top 15 des rendements du dividende</h2>\n");
        page.push_str("    <table>\n      <tr><th>Symbole</th><th>Nom</th><th>Dernier cours</th><th>Rendement</th></tr>\n");
        for record in by_yield.iter().take(15) {
            let _ = write!(
                page,
                "      <tr><td>{}</td><td>{}</td><td>{}</td><td class=\"positive\">{:.2}%</td></tr>\n",
                escape(&record.ticker),
                escape(&record.name),
                format_price(record.last_price),
                record.dividend_yield.unwrap_or(0.0) * 100.0,
            );
        }
        page.push_str("    </table>\n  </div>\n");
    }

    // Sector averages
    page.push_str("  <div class=\"card\">\n    <h2>Performance moyenne par secteur</h2>\n");
    page.push_str("    <table>\n      <tr><th>Secteur</th><th>Valeurs</th><th>Perf. totale moy.</th><th>Perf. annualisée moy.</th><th>Volatilité moy.</th><th>Sharpe moy.</th><th>Drawdown max moy.</th></tr>\n");
    for sector in sectors {
        let _ = write!(
            page,
            "      <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.1}%</td><td>{:.2}</td><td>{}</td></tr>\n",
            escape(&sector.sector),
            sector.count,
            signed_pct(sector.avg_total_return),
            signed_pct(sector.avg_annualized_return),
            sector.avg_volatility * 100.0,
            sector.avg_sharpe_ratio,
            signed_pct(sector.avg_max_drawdown),
        );
    }
    page.push_str("    </table>\n  </div>\n");

    let _ = write!(
        page,
        "  <div class=\"footer\">\n    <p>© {} - Analyse des valeurs de la BRVM - Mis à jour le {}</p>\n  </div>\n</div>\n</body>\n</html>\n",
        year, date
    );

    page
}

/// Percentage with sign and the CSS class matching it
fn signed_pct(fraction: f64) -> String {
    let class = if fraction >= 0.0 { "positive" } else { "negative" };
    format!(
        "<span class=\"{}\">{}{:.2}%</span>",
        class,
        if fraction >= 0.0 { "+" } else { "" },
        fraction * 100.0
    )
}

fn format_price(price: f64) -> String {
    if price >= 1000.0 {
        // Space thousands separators, French style
        let whole = price.round() as i64;
        let s = whole.to_string();
        let mut out = String::new();
        for (i, c) in s.chars().rev().enumerate() {
            if i > 0 && i % 3 == 0 {
                out.insert(0, '\u{202f}');
            }
            out.insert(0, c);
        }
        out
    } else {
        format!("{:.2}", price)
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(ticker: &str, total: f64, yield_: Option<f64>) -> MetricsRecord {
        MetricsRecord {
            ticker: ticker.to_string(),
            name: format!("{} SA", ticker),
            sector: "Banque".to_string(),
            first_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            last_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            span_days: 1461,
            first_price: 100.0,
            last_price: 100.0 * (1.0 + total),
            total_return: total,
            annualized_return: total / 4.0,
            volatility: 0.25,
            sharpe_ratio: 0.4,
            max_drawdown: -0.3,
            dividend_yield: yield_,
        }
    }

    #[test]
    fn test_render_dashboard_contains_sections() {
        let records = vec![record("SNTS", 0.5, Some(0.06)), record("SGBC", -0.1, None)];
        let sectors = vec![SectorMetrics {
            sector: "Banque".to_string(),
            count: 2,
            avg_total_return: 0.2,
            avg_annualized_return: 0.05,
            avg_volatility: 0.25,
            avg_sharpe_ratio: 0.4,
            avg_max_drawdown: -0.3,
        }];

        let html = render_dashboard(&records, &sectors, "01/08/2026", 2026);

        assert!(html.contains("Classement des valeurs de la BRVM"));
        assert!(html.contains("SNTS"));
        assert!(html.contains("+50.00%"));
        assert!(html.contains("-10.00%"));
        assert!(html.contains("Top 15 des rendements du dividende"));
        assert!(html.contains("Performance moyenne par secteur"));
        assert!(html.contains("01/08/2026"));
    }

    #[test]
    fn test_render_dashboard_escapes_names() {
        let mut bad = record("X<Y", 0.1, None);
        bad.name = "A & B <script>".to_string();
        let html = render_dashboard(&[bad], &[], "01/08/2026", 2026);

        assert!(html.contains("X&lt;Y"));
        assert!(html.contains("A &amp; B &lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_export_html_writes_index(){
        let dir = tempfile::TempDir::new().unwrap();
        let records = vec![record("SNTS", 0.5, None)];
        let path = export_html(&records, &[], dir.path()).unwrap();

        assert!(path.ends_with("index.html"));
        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("SNTS"));
    }
}
