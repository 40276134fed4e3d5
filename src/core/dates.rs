//! Calendar-agnostic date arithmetic on `chrono::NaiveDate`.
//!
//! All values are local calendar dates; nothing here performs timezone
//! conversion.

use crate::utils::error::{DateRangeError, Result};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// 格式化為 `YYYY-MM-DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// 解析日期字串。接受 `YYYY-MM-DD`、`YYYY/MM/DD`、RFC 3339 與不帶時區的
/// ISO datetime；datetime 只取其日期欄位。
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return Ok(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y/%m/%d") {
        return Ok(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(datetime.date_naive());
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Ok(datetime.date());
    }

    Err(DateRangeError::validation(format!(
        "invalid date format: '{}'",
        input
    )))
}

/// 週一起算的週桶：回傳 `date` 當天或之前最近的週一。週日歸屬前一個週一。
pub fn iso_week_bucket(date: NaiveDate) -> NaiveDate {
    let days_from_monday = date.weekday().num_days_from_monday() as i64;
    date - Duration::days(days_from_monday)
}

/// 0 = Sunday .. 6 = Saturday
pub fn day_of_week(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

/// An inclusive, validated span of calendar days.
///
/// The span is `Copy`; every call to [`DaySpan::dates`] or [`DaySpan::keys`]
/// starts a fresh iteration from `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySpan {
    start: NaiveDate,
    end: NaiveDate,
}

impl DaySpan {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(DateRangeError::InvalidRangeError {
                start: format_date(start),
                end: format_date(end),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn len(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn is_single_day(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn dates(&self) -> Days {
        Days {
            next: Some(self.start),
            end: self.end,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = String> {
        self.dates().map(format_date)
    }
}

impl IntoIterator for DaySpan {
    type Item = NaiveDate;
    type IntoIter = Days;

    fn into_iter(self) -> Days {
        self.dates()
    }
}

/// Iterator over the days of a [`DaySpan`], one calendar day per step.
#[derive(Debug, Clone)]
pub struct Days {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl Iterator for Days {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next?;
        if current > self.end {
            self.next = None;
            return None;
        }
        // succ_opt 只有在 NaiveDate::MAX 時回傳 None
        self.next = if current < self.end {
            current.succ_opt()
        } else {
            None
        };
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self.next {
            Some(next) if next <= self.end => (self.end - next).num_days() as usize + 1,
            _ => 0,
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Days {}

/// 解析兩個日期字串並建立 [`DaySpan`]。
pub fn enumerate_days(start: &str, end: &str) -> Result<DaySpan> {
    let start_date = parse_date(start).map_err(|_| DateRangeError::InvalidRangeError {
        start: start.to_string(),
        end: end.to_string(),
    })?;
    let end_date = parse_date(end).map_err(|_| DateRangeError::InvalidRangeError {
        start: start.to_string(),
        end: end.to_string(),
    })?;
    DaySpan::new(start_date, end_date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_format_date_zero_pads() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(format_date(d), "2024-03-01");
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();
        assert_eq!(date("2024-08-01"), expected);
        assert_eq!(date("2024/08/01"), expected);
        assert_eq!(date("2024-08-01T23:30:00+08:00"), expected);
        assert_eq!(date("2024-08-01T10:00:00"), expected);
        assert!(parse_date("not-a-date").is_err());
        assert!(parse_date("2024-02-30").is_err());
    }

    #[test]
    fn test_enumerate_days_inclusive() {
        let span = enumerate_days("2024-02-27", "2024-03-02").unwrap();
        let keys: Vec<String> = span.keys().collect();
        assert_eq!(
            keys,
            vec!["2024-02-27", "2024-02-28", "2024-02-29", "2024-03-01", "2024-03-02"]
        );
        assert_eq!(span.len(), 5);
    }

    #[test]
    fn test_enumerate_days_is_restartable() {
        let span = enumerate_days("2024-03-01", "2024-03-03").unwrap();
        let first: Vec<NaiveDate> = span.dates().collect();
        let second: Vec<NaiveDate> = span.into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(span.dates().len(), 3);
    }

    #[test]
    fn test_enumerate_days_single_day() {
        let span = enumerate_days("2024-03-01", "2024-03-01").unwrap();
        assert!(span.is_single_day());
        assert_eq!(span.keys().collect::<Vec<_>>(), vec!["2024-03-01"]);
    }

    #[test]
    fn test_enumerate_days_rejects_reversed_or_invalid() {
        assert!(matches!(
            enumerate_days("2024-03-02", "2024-03-01"),
            Err(DateRangeError::InvalidRangeError { .. })
        ));
        assert!(matches!(
            enumerate_days("garbage", "2024-03-01"),
            Err(DateRangeError::InvalidRangeError { .. })
        ));
    }

    #[test]
    fn test_iso_week_bucket() {
        // 2024-08-05 是週一
        assert_eq!(iso_week_bucket(date("2024-08-05")), date("2024-08-05"));
        assert_eq!(iso_week_bucket(date("2024-08-09")), date("2024-08-05"));
        // 週日屬於前一個週一
        assert_eq!(iso_week_bucket(date("2024-08-11")), date("2024-08-05"));
        assert_eq!(iso_week_bucket(date("2024-08-01")), date("2024-07-29"));
    }

    #[test]
    fn test_day_of_week_sunday_is_zero() {
        assert_eq!(day_of_week(date("2024-08-11")), 0);
        assert_eq!(day_of_week(date("2024-08-02")), 5);
    }
}
