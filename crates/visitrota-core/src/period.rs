//! Period math: canonical Monday anchors and visit-slot derivation.
//!
//! A period is one week, identified by its Monday. The visit itself happens
//! on `schedule.day_of_week` days after the anchor at `schedule.time_of_day`.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{Result, RotaError};
use crate::model::VisitSchedule;

/// Snap any date back to the Monday of its week.
pub fn period_anchor(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// The anchor `periods` weeks after `anchor`.
pub fn add_periods(anchor: NaiveDate, periods: u32) -> NaiveDate {
    anchor + Duration::weeks(i64::from(periods))
}

/// Parse an `HH:MM` time-of-day string.
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime> {
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() != 2 {
        return Err(RotaError::invalid(
            "time_of_day",
            format!("'{raw}' is not HH:MM"),
        ));
    }

    let hour: u32 = parts[0]
        .parse()
        .map_err(|_| RotaError::invalid("time_of_day", format!("'{raw}' is not HH:MM")))?;
    let minute: u32 = parts[1]
        .parse()
        .map_err(|_| RotaError::invalid("time_of_day", format!("'{raw}' is not HH:MM")))?;

    NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| RotaError::invalid("time_of_day", format!("'{raw}' is out of range")))
}

/// Validate a visit schedule without building a window.
pub fn validate_schedule(schedule: &VisitSchedule) -> Result<()> {
    if schedule.day_of_week > 6 {
        return Err(RotaError::invalid(
            "day_of_week",
            format!("{} is not in 0..=6 (0 = Monday)", schedule.day_of_week),
        ));
    }
    parse_time_of_day(&schedule.time_of_day)?;
    Ok(())
}

/// The one-hour visit window for a period: start at the scheduled weekday and
/// time, end one hour later.
pub fn visit_window(
    schedule: &VisitSchedule,
    period_start: NaiveDate,
) -> Result<(NaiveDateTime, NaiveDateTime)> {
    if schedule.day_of_week > 6 {
        return Err(RotaError::invalid(
            "day_of_week",
            format!("{} is not in 0..=6 (0 = Monday)", schedule.day_of_week),
        ));
    }

    let date = period_start + Duration::days(i64::from(schedule.day_of_week));
    let time = parse_time_of_day(&schedule.time_of_day)?;
    let start = date.and_time(time);
    Ok((start, start + Duration::hours(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn anchor_snaps_to_monday() {
        // 2026-02-16 is a Monday.
        assert_eq!(period_anchor(date(2026, 2, 16)), date(2026, 2, 16));
        assert_eq!(period_anchor(date(2026, 2, 18)), date(2026, 2, 16));
        assert_eq!(period_anchor(date(2026, 2, 22)), date(2026, 2, 16));
    }

    #[test]
    fn add_periods_steps_whole_weeks() {
        let anchor = date(2026, 2, 16);
        assert_eq!(add_periods(anchor, 0), anchor);
        assert_eq!(add_periods(anchor, 1), date(2026, 2, 23));
        assert_eq!(add_periods(anchor, 2), date(2026, 3, 2));
    }

    #[test]
    fn visit_window_offsets_from_anchor() {
        let schedule = VisitSchedule {
            day_of_week: 2, // Wednesday
            time_of_day: "14:30".to_string(),
        };
        let (start, end) = visit_window(&schedule, date(2026, 2, 16)).unwrap();
        assert_eq!(start.date(), date(2026, 2, 18));
        assert_eq!(start.time(), NaiveTime::from_hms_opt(14, 30, 0).unwrap());
        assert_eq!(end - start, Duration::hours(1));
    }

    #[test]
    fn rejects_malformed_time() {
        assert!(parse_time_of_day("noon").is_err());
        assert!(parse_time_of_day("25:00").is_err());
        assert!(parse_time_of_day("10:30:00").is_err());
    }

    #[test]
    fn rejects_day_out_of_range() {
        let schedule = VisitSchedule {
            day_of_week: 7,
            time_of_day: "10:00".to_string(),
        };
        assert!(validate_schedule(&schedule).is_err());
        assert!(visit_window(&schedule, date(2026, 2, 16)).is_err());
    }
}
