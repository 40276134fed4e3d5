use crate::core::dates::{day_of_week, format_date, iso_week_bucket, DaySpan};
use crate::domain::model::WeekGroup;
use chrono::NaiveDate;

/// 將範圍的日期依 ISO 週（週一起算）切分成連續區段，依日期遞增排列。
pub fn week_groups(span: &DaySpan) -> Vec<WeekGroup> {
    let mut buckets: Vec<(NaiveDate, Vec<NaiveDate>)> = Vec::new();

    for date in span.dates() {
        let bucket = iso_week_bucket(date);
        match buckets.last_mut() {
            Some((current, dates)) if *current == bucket => dates.push(date),
            _ => buckets.push((bucket, vec![date])),
        }
    }

    let total = buckets.len();
    buckets
        .into_iter()
        .enumerate()
        .map(|(week_index, (iso_week_start, dates))| {
            // buckets are only created with at least one date
            let first = dates[0];
            let last = dates[dates.len() - 1];
            WeekGroup {
                week_index,
                week_start_date: first,
                week_end_date: last,
                iso_week_start,
                days: dates.len(),
                start_day_of_week: day_of_week(first),
                is_first_week: week_index == 0,
                is_last_week: week_index + 1 == total,
                dates: dates.into_iter().map(format_date).collect(),
            }
        })
        .collect()
}

pub fn is_multi_week(groups: &[WeekGroup]) -> bool {
    groups.len() > 1
}
