pub mod dashboard;
pub mod pdf;
pub mod spreadsheet;

pub use dashboard::{export_html, render_dashboard};
pub use pdf::export_pdf;
pub use spreadsheet::export_excel;
