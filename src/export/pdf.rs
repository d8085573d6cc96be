use chrono::Local;
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Polygon, Rgb,
};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::models::{MarketData, MetricsRecord, SectorMetrics};

const PAGE_WIDTH: f64 = 210.0;
const PAGE_HEIGHT: f64 = 297.0;
const MARGIN: f64 = 20.0;

/// Render the PDF report: index evolution, top performers, sector
/// averages and a risk/return table. Charts are drawn with PDF line and
/// polygon primitives.
pub fn export_pdf(
    records: &[MetricsRecord],
    sectors: &[SectorMetrics],
    data: &MarketData,
    reports_dir: &Path,
) -> Result<PathBuf> {
    fs::create_dir_all(reports_dir)?;
    let path = reports_dir.join(format!("brvm_report_{}.pdf", Local::now().format("%Y%m%d")));

    let report = Report::new()?;

    // Page 1: introduction
    {
        let layer = report.page_one();
        report.header(&layer);
        let mut y = report.chapter_title(&layer, 250.0, "Présentation du rapport");
        report.paragraph(
            &layer,
            &mut y,
            "Ce rapport présente une analyse des performances des valeurs cotées à la \
             Bourse Régionale des Valeurs Mobilières (BRVM). L'analyse couvre les performances \
             historiques et les indicateurs de risque et de rendement pour chaque valeur et par \
             secteur. Les cours ne sont pas ajustés des dividendes ni des opérations sur titres.",
        );
    }

    // Page 2: index evolution
    if let Some(series) = data.get("BRVM-Composite") {
        let layer = report.new_page();
        report.header(&layer);
        let mut y = report.chapter_title(&layer, 250.0, "Évolution de l'indice BRVM-Composite");
        report.paragraph(
            &layer,
            &mut y,
            "Le graphique ci-dessous montre l'évolution de l'indice BRVM-Composite sur la \
             période étudiée. Cet indice est représentatif de la performance globale du marché.",
        );
        let closes: Vec<f64> = series.iter().map(|p| p.close).collect();
        let first = series.first().map(|p| p.date.format("%d/%m/%Y").to_string());
        let last = series.last().map(|p| p.date.format("%d/%m/%Y").to_string());
        report.line_chart(
            &layer,
            y - 130.0,
            &closes,
            first.as_deref().unwrap_or(""),
            last.as_deref().unwrap_or(""),
        );
    }

    // Page 3: top 15 total returns
    {
        let layer = report.new_page();
        report.header(&layer);
        let mut y = report.chapter_title(&layer, 250.0, "Performances des valeurs");
        report.paragraph(
            &layer,
            &mut y,
            "Performance totale des 15 meilleures valeurs depuis le début de leur historique, \
             en pourcentage du prix initial.",
        );

        let bars: Vec<(String, f64)> = records
            .iter()
            .take(15)
            .map(|r| (r.ticker.clone(), r.total_return * 100.0))
            .collect();
        report.bar_chart(&layer, y - 130.0, &bars);
    }

    // Page 4: sector averages
    {
        let layer = report.new_page();
        report.header(&layer);
        let mut y = report.chapter_title(&layer, 250.0, "Analyse par secteur");
        report.paragraph(
            &layer,
            &mut y,
            "Performance annualisée moyenne par secteur, classée par ordre décroissant.",
        );

        let bars: Vec<(String, f64)> = sectors
            .iter()
            .map(|s| (s.sector.clone(), s.avg_annualized_return * 100.0))
            .collect();
        report.bar_chart(&layer, y - 130.0, &bars);
    }

    // Page 5: top 10 annualized, as a table
    {
        let layer = report.new_page();
        report.header(&layer);
        let y = report.chapter_title(&layer, 250.0, "Top 10 des meilleures performances annualisées");

        let mut by_annualized: Vec<&MetricsRecord> = records.iter().collect();
        by_annualized.sort_by(|a, b| {
            b.annualized_return
                .partial_cmp(&a.annualized_return)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let header = ["Symbole", "Secteur", "Rend. ann.", "Volatilité", "Sharpe", "Durée"];
        let rows: Vec<Vec<String>> = by_annualized
            .iter()
            .take(10)
            .map(|r| {
                vec![
                    r.ticker.clone(),
                    r.sector.clone(),
                    format!("{:.2}%", r.annualized_return * 100.0),
                    format!("{:.2}%", r.volatility * 100.0),
                    format!("{:.2}", r.sharpe_ratio),
                    format!("{:.1} ans", r.span_days as f64 / 365.25),
                ]
            })
            .collect();
        report.table(&layer, y, &header, &rows);
    }

    // Page 6: risk/return, top Sharpe ratios
    {
        let layer = report.new_page();
        report.header(&layer);
        let mut y = report.chapter_title(&layer, 250.0, "Analyse Risque/Rendement");
        report.paragraph(
            &layer,
            &mut y,
            "Les valeurs ci-dessous offrent le meilleur rendement ajusté au risque \
             (ratio de Sharpe) sur la période étudiée.",
        );

        let mut by_sharpe: Vec<&MetricsRecord> = records
            .iter()
            .filter(|r| r.sector != crate::models::INDEX_SECTOR)
            .collect();
        by_sharpe.sort_by(|a, b| {
            b.sharpe_ratio
                .partial_cmp(&a.sharpe_ratio)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let header = ["Symbole", "Rend. ann.", "Volatilité", "Sharpe", "Drawdown max"];
        let rows: Vec<Vec<String>> = by_sharpe
            .iter()
            .take(10)
            .map(|r| {
                vec![
                    r.ticker.clone(),
                    format!("{:.2}%", r.annualized_return * 100.0),
                    format!("{:.2}%", r.volatility * 100.0),
                    format!("{:.2}", r.sharpe_ratio),
                    format!("{:.2}%", r.max_drawdown * 100.0),
                ]
            })
            .collect();
        report.table(&layer, y - 8.0, &header, &rows);
    }

    report.save(&path)?;
    Ok(path)
}

/// Thin wrapper over the PDF document: one place for fonts, page
/// creation and the drawing helpers shared by every section
struct Report {
    doc: PdfDocumentReference,
    first_page: (printpdf::PdfPageIndex, printpdf::PdfLayerIndex),
    font: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Report {
    fn new() -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(
            "Analyse des performances de la BRVM",
            mm(PAGE_WIDTH),
            mm(PAGE_HEIGHT),
            "Calque 1",
        );
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| Error::Export(format!("PDF font error: {}", e)))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| Error::Export(format!("PDF font error: {}", e)))?;

        Ok(Self {
            doc,
            first_page: (page, layer),
            font,
            bold,
        })
    }

    fn page_one(&self) -> PdfLayerReference {
        self.doc.get_page(self.first_page.0).get_layer(self.first_page.1)
    }

    fn new_page(&self) -> PdfLayerReference {
        let (page, layer) = self.doc.add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Calque 1");
        self.doc.get_page(page).get_layer(layer)
    }

    fn save(self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        self.doc
            .save(&mut BufWriter::new(file))
            .map_err(|e| Error::Export(format!("PDF write error: {}", e)))
    }

    /// Title block at the top of each page
    fn header(&self, layer: &PdfLayerReference) {
        layer.set_fill_color(dark());
        layer.use_text(
            "Analyse des performances de la BRVM",
            15.0,
            mm(MARGIN),
            mm(280.0),
            &self.bold,
        );
        layer.use_text(
            format!("Rapport généré le {}", Local::now().format("%d/%m/%Y")),
            9.0,
            mm(MARGIN),
            mm(273.0),
            &self.font,
        );

        stroke_line(layer, MARGIN, 270.0, PAGE_WIDTH - MARGIN, 270.0, grey(), 0.4);
    }

    /// Chapter title with the tinted band the original report used;
    /// returns the y position below it
    fn chapter_title(&self, layer: &PdfLayerReference, y: f64, title: &str) -> f64 {
        fill_rect(layer, MARGIN, y - 2.0, PAGE_WIDTH - MARGIN, y + 6.0, band());
        layer.set_fill_color(dark());
        layer.use_text(title, 12.0, mm(MARGIN + 2.0), mm(y), &self.bold);
        y - 10.0
    }

    /// Left-aligned body text with naive wrapping; advances the cursor
    fn paragraph(&self, layer: &PdfLayerReference, y: &mut f64, text: &str) {
        layer.set_fill_color(dark());
        for line in wrap_text(text, 95) {
            layer.use_text(line, 10.0, mm(MARGIN), mm(*y), &self.font);
            *y -= 5.0;
        }
        *y -= 3.0;
    }

    /// Simple table: tinted header row, one line of grid per row
    fn table(&self, layer: &PdfLayerReference, y: f64, header: &[&str], rows: &[Vec<String>]) {
        let width = (PAGE_WIDTH - 2.0 * MARGIN) / header.len() as f64;
        let mut row_y = y;

        fill_rect(layer, MARGIN, row_y - 2.0, PAGE_WIDTH - MARGIN, row_y + 5.0, band());
        layer.set_fill_color(dark());
        for (i, title) in header.iter().enumerate() {
            layer.use_text(*title, 9.0, mm(MARGIN + 1.5 + i as f64 * width), mm(row_y), &self.bold);
        }
        row_y -= 7.0;

        for row in rows {
            for (i, cell) in row.iter().enumerate() {
                layer.use_text(
                    cell.as_str(),
                    9.0,
                    mm(MARGIN + 1.5 + i as f64 * width),
                    mm(row_y),
                    &self.font,
                );
            }
            stroke_line(
                layer,
                MARGIN,
                row_y - 2.0,
                PAGE_WIDTH - MARGIN,
                row_y - 2.0,
                grey(),
                0.2,
            );
            row_y -= 7.0;
        }
    }

    /// Vertical bar chart with a zero baseline; values are percentages
    fn bar_chart(&self, layer: &PdfLayerReference, bottom: f64, bars: &[(String, f64)]) {
        if bars.is_empty() {
            return;
        }

        let chart_height = 110.0;
        let chart_width = PAGE_WIDTH - 2.0 * MARGIN;
        let max = bars.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max).max(0.0);
        let min = bars.iter().map(|(_, v)| *v).fold(0.0_f64, f64::min).min(0.0);
        let span = (max - min).max(1e-9);

        // y of the zero line inside the chart box
        let zero_y = bottom + chart_height * (0.0 - min) / span;
        stroke_line(layer, MARGIN, zero_y, MARGIN + chart_width, zero_y, grey(), 0.4);

        let slot = chart_width / bars.len() as f64;
        let bar_width = slot * 0.65;

        for (i, (label, value)) in bars.iter().enumerate() {
            let x0 = MARGIN + i as f64 * slot + (slot - bar_width) / 2.0;
            let value_y = bottom + chart_height * (value - min) / span;
            let (y0, y1) = if *value >= 0.0 { (zero_y, value_y) } else { (value_y, zero_y) };

            fill_rect(layer, x0, y0, x0 + bar_width, y1.max(y0 + 0.2), blue());

            layer.set_fill_color(dark());
            layer.use_text(
                format!("{:.1}", value),
                6.0,
                mm(x0),
                mm(if *value >= 0.0 { y1 + 2.0 } else { y0 - 4.0 }),
                &self.font,
            );
            layer.use_text(truncate(label, 9), 6.0, mm(x0), mm(zero_y - 4.0), &self.font);
        }
    }

    /// Polyline of one series across the chart box, with min/max labels
    fn line_chart(&self, layer: &PdfLayerReference, bottom: f64, values: &[f64], first: &str, last: &str) {
        if values.len() < 2 {
            return;
        }

        let chart_height = 110.0;
        let chart_width = PAGE_WIDTH - 2.0 * MARGIN;
        let max = values.iter().cloned().fold(f64::MIN, f64::max);
        let min = values.iter().cloned().fold(f64::MAX, f64::min);
        let span = (max - min).max(1e-9);

        // Frame
        stroke_line(layer, MARGIN, bottom, MARGIN, bottom + chart_height, grey(), 0.4);
        stroke_line(layer, MARGIN, bottom, MARGIN + chart_width, bottom, grey(), 0.4);

        let step = chart_width / (values.len() - 1) as f64;
        let points: Vec<(Point, bool)> = values
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let x = MARGIN + i as f64 * step;
                let y = bottom + chart_height * (value - min) / span;
                (Point::new(mm(x), mm(y)), false)
            })
            .collect();

        layer.set_outline_color(blue());
        layer.set_outline_thickness(0.8);
        layer.add_line(Line {
            points,
            is_closed: false,
        });

        layer.set_fill_color(dark());
        layer.use_text(format!("{:.0}", max), 7.0, mm(MARGIN + 1.0), mm(bottom + chart_height - 3.0), &self.font);
        layer.use_text(format!("{:.0}", min), 7.0, mm(MARGIN + 1.0), mm(bottom + 2.0), &self.font);
        layer.use_text(first, 7.0, mm(MARGIN), mm(bottom - 5.0), &self.font);
        layer.use_text(last, 7.0, mm(MARGIN + chart_width - 22.0), mm(bottom - 5.0), &self.font);
    }
}

/// Convert millimetre values (kept as f64 through the layout math) to
/// the f32 `Mm` that printpdf expects.
fn mm(v: f64) -> Mm {
    Mm(v as f32)
}

fn stroke_line(layer: &PdfLayerReference, x0: f64, y0: f64, x1: f64, y1: f64, color: Color, width: f64) {
    layer.set_outline_color(color);
    layer.set_outline_thickness(width as f32);
    layer.add_line(Line {
        points: vec![
            (Point::new(mm(x0), mm(y0)), false),
            (Point::new(mm(x1), mm(y1)), false),
        ],
        is_closed: false,
    });
}

fn fill_rect(layer: &PdfLayerReference, x0: f64, y0: f64, x1: f64, y1: f64, color: Color) {
    layer.set_fill_color(color);
    layer.add_polygon(Polygon {
        rings: vec![vec![
            (Point::new(mm(x0), mm(y0)), false),
            (Point::new(mm(x1), mm(y0)), false),
            (Point::new(mm(x1), mm(y1)), false),
            (Point::new(mm(x0), mm(y1)), false),
        ]],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    });
}

fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + word.chars().count() + 1 > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn blue() -> Color {
    Color::Rgb(Rgb::new(0.05, 0.42, 0.99, None))
}

fn dark() -> Color {
    Color::Rgb(Rgb::new(0.13, 0.13, 0.13, None))
}

fn grey() -> Color {
    Color::Rgb(Rgb::new(0.55, 0.55, 0.55, None))
}

fn band() -> Color {
    Color::Rgb(Rgb::new(0.78, 0.86, 1.0, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text() {
        let lines = wrap_text("un deux trois quatre cinq", 10);
        assert_eq!(lines, vec!["un deux", "trois", "quatre", "cinq"]);
    }

    #[test]
    fn test_wrap_text_single_line() {
        assert_eq!(wrap_text("court", 80), vec!["court"]);
        assert!(wrap_text("", 80).is_empty());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("BRVM-Composite", 9), "BRVM-Comp");
        assert_eq!(truncate("SNTS", 9), "SNTS");
    }
}
