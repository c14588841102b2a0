//! Rust implementation of the car calendar rotation scheduler.
//!
//! Assigns exactly one vehicle to every day of a date range so that no
//! manufacturer appears on consecutive days, weekends lean towards fast cars
//! and weekdays towards offroad ones, and the favorite vehicle shows up once
//! per Sunday-to-Saturday week.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use chrono::NaiveDate;
use pyo3::prelude::*;

pub mod calendar;
mod config;
pub mod logging;
mod models;
pub mod pool;
pub mod scheduler;

pub use calendar::{duration_between, week_chunks, Calendar, CalendarError};
pub use config::RotationConfig;
pub use models::{Assignment, ModelError, Vehicle, VehicleClass, VehicleId};
pub use pool::{FavoriteSource, ManufacturerId, PoolError, VehiclePool};
pub use scheduler::{generate, RotationResult, RotationScheduler, RotationStats, SchedulerError};

fn value_error(err: impl std::fmt::Display) -> PyErr {
    pyo3::exceptions::PyValueError::new_err(err.to_string())
}

fn run_rotation(
    vehicles: Vec<Vehicle>,
    start_date: NaiveDate,
    duration_days: i64,
    config: Option<RotationConfig>,
) -> PyResult<Vec<Assignment>> {
    let pool = VehiclePool::for_rotation(vehicles).map_err(value_error)?;
    let scheduler = RotationScheduler::new(&pool, config.unwrap_or_default());
    scheduler
        .run_seeded(start_date, duration_days)
        .map(|result| result.assignments)
        .map_err(value_error)
}

/// Generate a rotation calendar.
///
/// # Arguments
/// * `vehicles` - The vehicle pool; every flagged favorite is placed once per week
/// * `start_date` - First day of the calendar
/// * `duration_days` - Number of days to fill (must be positive)
/// * `config` - Retry budget, verbosity and seed
///
/// # Returns
/// * One Assignment per day, in date order
///
/// # Raises
/// * ValueError for an invalid range, too few manufacturers, or an infeasible pool
#[pyfunction]
#[pyo3(signature = (vehicles, start_date, duration_days, config=None))]
fn generate_calendar(
    vehicles: Vec<Vehicle>,
    start_date: NaiveDate,
    duration_days: i64,
    config: Option<RotationConfig>,
) -> PyResult<Vec<Assignment>> {
    run_rotation(vehicles, start_date, duration_days, config)
}

/// Generate a rotation calendar for the half-open range `[start_date, end_date)`.
#[pyfunction]
#[pyo3(signature = (vehicles, start_date, end_date, config=None))]
fn generate_calendar_between(
    vehicles: Vec<Vehicle>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    config: Option<RotationConfig>,
) -> PyResult<Vec<Assignment>> {
    let duration_days = duration_between(start_date, end_date).map_err(value_error)?;
    run_rotation(vehicles, start_date, duration_days, config)
}

/// Transfer the favorite designation and return the updated vehicles.
#[pyfunction]
#[pyo3(signature = (vehicles, target_id, old_favorite_id=None))]
fn make_favorite(
    vehicles: Vec<Vehicle>,
    target_id: VehicleId,
    old_favorite_id: Option<VehicleId>,
) -> PyResult<Vec<Vehicle>> {
    let mut pool = VehiclePool::new(vehicles).map_err(value_error)?;
    pool.make_favorite(target_id, old_favorite_id)
        .map_err(value_error)?;
    Ok(pool.vehicles().to_vec())
}

/// Group assignments into weeks ending on Saturday.
#[pyfunction]
fn group_weeks(assignments: Vec<Assignment>) -> Vec<Vec<Assignment>> {
    week_chunks(&assignments)
        .into_iter()
        .map(|week| week.to_vec())
        .collect()
}

/// The carcal.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Core data types
    m.add_class::<VehicleClass>()?;
    m.add_class::<Vehicle>()?;
    m.add_class::<Assignment>()?;

    // Config types
    m.add_class::<RotationConfig>()?;

    // Algorithms
    m.add_function(wrap_pyfunction!(generate_calendar, m)?)?;
    m.add_function(wrap_pyfunction!(generate_calendar_between, m)?)?;
    m.add_function(wrap_pyfunction!(make_favorite, m)?)?;
    m.add_function(wrap_pyfunction!(group_weeks, m)?)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn vehicles() -> Vec<Vehicle> {
        vec![
            Vehicle::new(1, "A", "A1", VehicleClass::Fast),
            Vehicle::new(2, "B", "B1", VehicleClass::Normal).favorite(),
            Vehicle::new(3, "C", "C1", VehicleClass::Offroad),
        ]
    }

    #[test]
    fn test_run_rotation_with_seed() {
        let config = RotationConfig {
            seed: Some(1),
            ..RotationConfig::default()
        };
        let days = run_rotation(vehicles(), d(2013, 11, 10), 14, Some(config.clone())).unwrap();
        let again = run_rotation(vehicles(), d(2013, 11, 10), 14, Some(config)).unwrap();
        assert_eq!(days.len(), 14);
        assert_eq!(days, again);
    }

    #[test]
    fn test_group_weeks_round_trip_length() {
        let days = run_rotation(vehicles(), d(2013, 11, 13), 10, None).unwrap();
        let weeks = group_weeks(days);
        let sizes: Vec<usize> = weeks.iter().map(|w| w.len()).collect();
        // Wednesday start: Wed-Sat, then Sun-Fri
        assert_eq!(sizes, vec![4, 6]);
    }

    #[test]
    fn test_make_favorite_returns_updated_pool() {
        let updated = make_favorite(vehicles(), 3, None).unwrap();
        let favorites: Vec<VehicleId> = updated
            .iter()
            .filter(|v| v.is_favorite())
            .map(|v| v.id)
            .collect();
        assert_eq!(favorites, vec![3]);
    }

    #[test]
    fn test_run_rotation_accepts_two_favorites() {
        let mut two = vehicles();
        two[0] = two[0].clone().favorite();
        two.push(Vehicle::new(4, "D", "D1", VehicleClass::Offroad));
        let config = RotationConfig {
            seed: Some(1),
            ..RotationConfig::default()
        };
        let days = run_rotation(two, d(2013, 11, 10), 7, Some(config)).unwrap();
        assert_eq!(days.len(), 7);
        assert_eq!(days.iter().filter(|a| a.vehicle.id == 1).count(), 1);
        assert_eq!(days.iter().filter(|a| a.vehicle.id == 2).count(), 1);
    }
}
