//! Week arithmetic and the caller-facing calendar.
//!
//! Weeks run Sunday through Saturday; Saturday and Sunday are weekend days.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use thiserror::Error;

use crate::models::{Assignment, VehicleId};

/// Errors from converting user-supplied ranges.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("End date {end} must be after start date {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

#[inline]
pub fn is_saturday(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Sat
}

#[inline]
pub fn is_sunday(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Sun
}

#[inline]
pub fn is_weekend(date: NaiveDate) -> bool {
    is_saturday(date) || is_sunday(date)
}

/// The Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_sunday() as u64;
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// Number of days in the half-open range `[start, end)`.
pub fn duration_between(start: NaiveDate, end: NaiveDate) -> Result<i64, CalendarError> {
    let days = (end - start).num_days();
    if days <= 0 {
        return Err(CalendarError::InvalidRange { start, end });
    }
    Ok(days)
}

/// Split assignments into chunks that each end on a Saturday.
///
/// Every chunk holds 1-7 entries; the first and last may be partial.
pub fn week_chunks(assignments: &[Assignment]) -> Vec<&[Assignment]> {
    let mut weeks = Vec::new();
    let mut chunk_start = 0;
    for (i, day) in assignments.iter().enumerate() {
        if is_saturday(day.date) {
            weeks.push(&assignments[chunk_start..=i]);
            chunk_start = i + 1;
        }
    }
    if chunk_start < assignments.len() {
        weeks.push(&assignments[chunk_start..]);
    }
    weeks
}

/// A named, generated calendar.
#[derive(Clone, Debug, PartialEq)]
pub struct Calendar {
    pub name: String,
    pub assignments: Vec<Assignment>,
}

impl Calendar {
    pub fn new(name: impl Into<String>, assignments: Vec<Assignment>) -> Self {
        Self {
            name: name.into(),
            assignments,
        }
    }

    pub fn weeks(&self) -> Vec<&[Assignment]> {
        week_chunks(&self.assignments)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.assignments.first().map(|a| a.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.assignments.last().map(|a| a.date)
    }

    /// How many days a vehicle is assigned.
    pub fn vehicle_count(&self, id: VehicleId) -> usize {
        self.assignments
            .iter()
            .filter(|a| a.vehicle.id == id)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Vehicle, VehicleClass};

    fn d(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn days_from(start: NaiveDate, count: u64) -> Vec<Assignment> {
        let car = Vehicle::new(1, "Porsche", "GT3", VehicleClass::Fast);
        (0..count)
            .map(|i| Assignment {
                date: start + Days::new(i),
                vehicle: car.clone(),
            })
            .collect()
    }

    #[test]
    fn test_weekday_predicates() {
        assert!(is_sunday(d(2013, 11, 10)));
        assert!(is_saturday(d(2013, 11, 9)));
        assert!(is_weekend(d(2013, 11, 10)));
        assert!(is_weekend(d(2013, 11, 9)));
        assert!(!is_weekend(d(2013, 11, 11)));
    }

    #[test]
    fn test_week_start() {
        // 2014-05-04 is a Sunday
        assert_eq!(week_start(d(2014, 5, 4)), d(2014, 5, 4));
        assert_eq!(week_start(d(2014, 5, 7)), d(2014, 5, 4));
        assert_eq!(week_start(d(2014, 5, 10)), d(2014, 5, 4));
        assert_eq!(week_start(d(2014, 5, 11)), d(2014, 5, 11));
    }

    #[test]
    fn test_duration_between() {
        assert_eq!(duration_between(d(2013, 11, 10), d(2013, 12, 30)), Ok(50));
        assert_eq!(
            duration_between(d(2013, 11, 10), d(2013, 11, 10)),
            Err(CalendarError::InvalidRange {
                start: d(2013, 11, 10),
                end: d(2013, 11, 10)
            })
        );
        assert!(duration_between(d(2013, 11, 10), d(2013, 11, 1)).is_err());
    }

    #[test]
    fn test_full_weeks_from_sunday() {
        let calendar = Calendar::new("six years", days_from(d(2013, 11, 10), 52 * 7 * 6));
        let weeks = calendar.weeks();
        assert_eq!(weeks.len(), 52 * 6);
        assert!(weeks.iter().all(|w| w.len() == 7));
        assert!(is_sunday(weeks[0][0].date));
    }

    #[test]
    fn test_partial_weeks_kept() {
        // Thursday 2014-05-01 through Monday 2014-05-12
        let calendar = Calendar::new("partial", days_from(d(2014, 5, 1), 12));
        let sizes: Vec<usize> = calendar.weeks().iter().map(|w| w.len()).collect();
        assert_eq!(sizes, vec![3, 7, 2]);
        assert_eq!(calendar.first_date(), Some(d(2014, 5, 1)));
        assert_eq!(calendar.last_date(), Some(d(2014, 5, 12)));
        assert_eq!(calendar.vehicle_count(1), 12);
    }

    #[test]
    fn test_empty_calendar_has_no_weeks() {
        let calendar = Calendar::new("empty", vec![]);
        assert!(calendar.weeks().is_empty());
        assert_eq!(calendar.first_date(), None);
    }
}
