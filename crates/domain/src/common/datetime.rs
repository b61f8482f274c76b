//! Epoch-millisecond timestamps as persisted in save slots.

use chrono::{DateTime, Utc};

/// Converts epoch milliseconds into a UTC datetime.
///
/// Returns `None` for values chrono cannot represent.
///
/// # Examples
///
/// ```
/// use herostory_domain::common::datetime_from_millis;
/// use chrono::Datelike;
///
/// let dt = datetime_from_millis(1_705_314_600_000).unwrap();
/// assert_eq!(dt.year(), 2024);
/// ```
pub fn datetime_from_millis(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

/// Formats a date the way story titles display it: `dd.mm.yyyy`.
pub fn format_day_month_year(dt: DateTime<Utc>) -> String {
    dt.format("%d.%m.%Y").to_string()
}
