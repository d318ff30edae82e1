//! Calendar and timestamp utilities

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Timestamp layout used by the detection source (always UTC, no offset)
pub const SOURCE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current calendar date in UTC
pub fn today() -> NaiveDate {
    now().date_naive()
}

/// Midnight UTC at the beginning of `date`
pub fn day_start(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::default()))
}

/// `YYYYMMDD`, the date parameter format of the detection source
pub fn compact_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Parse a source timestamp (`YYYY-MM-DD HH:MM:SS`, implicitly UTC)
pub fn parse_source_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value.trim(), SOURCE_TIMESTAMP_FORMAT)
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Every calendar date from `from` to `to`, both inclusive, ascending
///
/// Empty when `from` is after `to`.
pub fn dates_between(from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    from.iter_days().take_while(move |date| *date <= to)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_now_returns_recent_timestamp() {
        let timestamp = now();
        assert!(timestamp.timestamp() > 946_684_800); // 2000-01-01 00:00:00 UTC
    }

    #[test]
    fn test_day_start() {
        let start = day_start(date(2024, 2, 29));
        assert_eq!(start.to_rfc3339(), "2024-02-29T00:00:00+00:00");
    }

    #[test]
    fn test_compact_date() {
        assert_eq!(compact_date(date(2019, 1, 3)), "20190103");
    }

    #[test]
    fn test_parse_source_timestamp() {
        let parsed = parse_source_timestamp("2019-01-03 10:12:54").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2019, 1, 3, 10, 12, 54).unwrap());
    }

    #[test]
    fn test_parse_source_timestamp_rejects_garbage() {
        assert!(parse_source_timestamp("yesterday").is_err());
        assert!(parse_source_timestamp("2019-13-03 10:12:54").is_err());
    }

    #[test]
    fn test_dates_between_inclusive() {
        let dates: Vec<_> = dates_between(date(2024, 2, 27), date(2024, 3, 1)).collect();
        assert_eq!(
            dates,
            vec![date(2024, 2, 27), date(2024, 2, 28), date(2024, 2, 29), date(2024, 3, 1)]
        );
    }

    #[test]
    fn test_dates_between_single_and_empty() {
        assert_eq!(dates_between(date(2024, 1, 1), date(2024, 1, 1)).count(), 1);
        assert_eq!(dates_between(date(2024, 1, 2), date(2024, 1, 1)).count(), 0);
    }
}
