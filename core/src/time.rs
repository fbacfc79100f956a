use chrono::{Datelike, Duration, Local, NaiveDate};
use anyhow::{anyhow, Result};

use crate::model::summary::MonthKey;

/// Date format used by the series store (`20240131`).
pub const RECORD_DATE_FORMAT: &str = "%Y%m%d";

pub fn parse_record_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    if input.len() != 8 || !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(anyhow!("Expected an 8 digit YYYYMMDD date, got {:?}", input));
    }

    NaiveDate::parse_from_str(input, RECORD_DATE_FORMAT)
        .map_err(|e| anyhow!("Invalid calendar date {:?}: {}", input, e))
}

pub fn format_record_date(date: NaiveDate) -> String {
    date.format(RECORD_DATE_FORMAT).to_string()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Inclusive window of `days` calendar days ending on `end`.
/// Returns None for an empty window.
pub fn window_ending(end: NaiveDate, days: u32) -> Option<(NaiveDate, NaiveDate)> {
    if days == 0 {
        return None;
    }
    let start = end.checked_sub_signed(Duration::days(days as i64 - 1))?;
    Some((start, end))
}

/// Every date from `start` to `end`, both inclusive. Empty when `start > end`.
pub fn dates_between(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

pub fn month_key(date: NaiveDate) -> MonthKey {
    MonthKey::Month {
        year: date.year(),
        month: date.month(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_record_date() {
        assert_eq!(parse_record_date("20240131").unwrap(), ymd(2024, 1, 31));
        assert_eq!(parse_record_date(" 20240229 ").unwrap(), ymd(2024, 2, 29));
        assert!(parse_record_date("20230229").is_err());
        assert!(parse_record_date("2024-01-31").is_err());
        assert!(parse_record_date("2024013").is_err());
        assert!(parse_record_date("").is_err());
    }

    #[test]
    fn test_format_record_date() {
        assert_eq!(format_record_date(ymd(2024, 3, 5)), "20240305");
    }

    #[test]
    fn test_window_ending() {
        assert_eq!(window_ending(ymd(2024, 3, 2), 3), Some((ymd(2024, 2, 29), ymd(2024, 3, 2))));
        assert_eq!(window_ending(ymd(2024, 3, 2), 1), Some((ymd(2024, 3, 2), ymd(2024, 3, 2))));
        assert_eq!(window_ending(ymd(2024, 3, 2), 0), None);
    }

    #[test]
    fn test_dates_between() {
        let dates: Vec<_> = dates_between(ymd(2023, 12, 30), ymd(2024, 1, 2)).collect();
        assert_eq!(dates, vec![ymd(2023, 12, 30), ymd(2023, 12, 31), ymd(2024, 1, 1), ymd(2024, 1, 2)]);
        assert_eq!(dates_between(ymd(2024, 1, 2), ymd(2024, 1, 1)).count(), 0);
    }

    #[test]
    fn test_month_key() {
        assert_eq!(month_key(ymd(2024, 1, 31)).to_string(), "2024/01");
    }
}
