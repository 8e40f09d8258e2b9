//! Business-timezone helpers
//!
//! Every date → timestamp conversion happens at the API layer; the order
//! engine and the reports only see `i64` Unix millis.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// Local midnight of `date` as Unix millis.
///
/// If midnight does not exist locally (DST gap) the UTC midnight is used.
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    naive
        .and_local_timezone(tz)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// Exclusive end of `date`: the next local midnight
pub fn day_end_millis(date: NaiveDate, tz: Tz) -> i64 {
    let next_day = date.succ_opt().unwrap_or(date);
    day_start_millis(next_day, tz)
}

/// Business date a timestamp falls on
pub fn business_date(millis: i64, tz: Tz) -> NaiveDate {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .unwrap_or_default()
        .with_timezone(&tz)
        .date_naive()
}

/// Today in the business timezone
pub fn today(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// Format a timestamp as local `YYYY-MM-DD HH:MM`
pub fn format_local(millis: i64, tz: Tz) -> String {
    tz.timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// Resolve an optional `from`/`to` pair into a `[start, end)` millis range.
///
/// Missing bounds default to today; `from` after `to` is rejected.
pub fn date_range_millis(from: Option<&str>, to: Option<&str>, tz: Tz) -> AppResult<(i64, i64)> {
    let from = from.map(parse_date).transpose()?.unwrap_or_else(|| today(tz));
    let to = to.map(parse_date).transpose()?.unwrap_or(from.max(today(tz)));
    if from > to {
        return Err(AppError::validation(format!(
            "Start date {} is after end date {}",
            from, to
        )));
    }
    Ok((day_start_millis(from, tz), day_end_millis(to, tz)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Kolkata;

    #[test]
    fn test_day_bounds_in_ist() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        // IST is UTC+05:30
        let start = day_start_millis(date, Kolkata);
        let utc_midnight = date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp_millis();
        assert_eq!(start, utc_midnight - 5 * 3_600_000 - 30 * 60_000);
        assert_eq!(day_end_millis(date, Kolkata) - start, 86_400_000);
    }

    #[test]
    fn test_business_date_crosses_utc_midnight() {
        // 2026-03-14 20:00 UTC is 2026-03-15 01:30 IST
        let ts = NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis();
        assert_eq!(
            business_date(ts, Kolkata),
            NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
        );
        assert_eq!(format_local(ts, Kolkata), "2026-03-15 01:30");
    }

    #[test]
    fn test_date_range_validation() {
        assert!(parse_date("14/03/2026").is_err());
        let (start, end) =
            date_range_millis(Some("2026-03-01"), Some("2026-03-02"), Kolkata).unwrap();
        assert_eq!(end - start, 2 * 86_400_000);
        assert!(date_range_millis(Some("2026-03-05"), Some("2026-03-02"), Kolkata).is_err());
    }
}
