//! Display formatting shared by the preview and the exported document

use chrono::NaiveDate;

/// Money with exactly two decimals: `£25.00`
pub fn format_money(symbol: &str, value: f64) -> String {
    format!("{}{:.2}", symbol, value)
}

/// Shortest representation of a rate or quantity: `25`, `25.5`
pub fn format_number(value: f64) -> String {
    format!("{}", value)
}

/// Issue date as `18 OCT 2026`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%-d %b %Y").to_string().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money("£", 25.0), "£25.00");
        assert_eq!(format_money("$", 1234.567), "$1234.57");
        assert_eq!(format_money("£", 0.0), "£0.00");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(25.0), "25");
        assert_eq!(format_number(25.5), "25.5");
        assert_eq!(format_number(0.0), "0");
    }

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(format_date(date), "18 OCT 2026");
        let date = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert_eq!(format_date(date), "5 JAN 2025");
        let date = NaiveDate::from_ymd_opt(2024, 9, 30).unwrap();
        assert_eq!(format_date(date), "30 SEP 2024");
    }

    #[test]
    fn test_format_date_month_abbreviations() {
        let months: Vec<String> = (1..=12)
            .map(|month| format_date(NaiveDate::from_ymd_opt(2026, month, 1).unwrap()))
            .collect();
        assert_eq!(months[0], "1 JAN 2026");
        assert_eq!(months[4], "1 MAY 2026");
        assert_eq!(months[11], "1 DEC 2026");
        assert!(months.iter().all(|m| m.split(' ').nth(1).map(str::len) == Some(3)));
    }
}
