use chrono::NaiveDate;
use std::path::PathBuf;

/// Get data directory from environment variable or use default
pub fn get_data_dir() -> PathBuf {
    std::env::var("BRVM_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

/// Get spreadsheet exports directory from environment variable or use default
pub fn get_exports_dir() -> PathBuf {
    std::env::var("BRVM_EXPORTS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("exports"))
}

/// Get PDF reports directory from environment variable or use default
pub fn get_reports_dir() -> PathBuf {
    std::env::var("BRVM_REPORTS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("reports"))
}

/// Get dashboard output directory from environment variable or use default
pub fn get_dashboard_dir() -> PathBuf {
    std::env::var("BRVM_DASHBOARD_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("dashboard"))
}

/// Get published-site directory from environment variable or use default
pub fn get_site_dir() -> PathBuf {
    std::env::var("BRVM_SITE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("docs"))
}

/// Parse a number in French formatting: space (or NBSP) thousands
/// separators and a decimal comma. "1 250,50" -> 1250.50
pub fn parse_french_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}' && *c != '\u{202f}')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    cleaned.parse().ok()
}

/// Parse a date from the formats the two sources emit:
/// "YYYY-MM-DD", "YYYY-MM-DDTHH:MM:SS", "YYYY-MM-DD HH:MM:SS" or "DD/MM/YYYY"
pub fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    // Datetime strings: keep only the date part
    let date_part = raw
        .split(['T', ' '])
        .next()
        .unwrap_or(raw);

    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%d/%m/%Y"))
        .ok()
}

/// File-safe ticker name ("BRVM-C/I" style symbols contain slashes)
pub fn sanitize_ticker(ticker: &str) -> String {
    ticker.replace('/', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_french_number() {
        assert_eq!(parse_french_number("1 250,50"), Some(1250.50));
        assert_eq!(parse_french_number("7400"), Some(7400.0));
        assert_eq!(parse_french_number("0,95"), Some(0.95));
        assert_eq!(parse_french_number("12\u{a0}345"), Some(12345.0));
        assert_eq!(parse_french_number(""), None);
        assert_eq!(parse_french_number("-"), None);
        assert_eq!(parse_french_number("n/a"), None);
    }

    #[test]
    fn test_parse_flexible_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();
        assert_eq!(parse_flexible_date("2024-05-03"), Some(expected));
        assert_eq!(parse_flexible_date("2024-05-03T00:00:00"), Some(expected));
        assert_eq!(parse_flexible_date("2024-05-03 10:30:00"), Some(expected));
        assert_eq!(parse_flexible_date("03/05/2024"), Some(expected));
        assert_eq!(parse_flexible_date("not a date"), None);
    }

    #[test]
    fn test_sanitize_ticker() {
        assert_eq!(sanitize_ticker("SNTS"), "SNTS");
        assert_eq!(sanitize_ticker("BRVM-C/I"), "BRVM-C-I");
    }
}
