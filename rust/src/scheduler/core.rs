//! Core rotation scheduler implementation.

use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::calendar::{duration_between, is_saturday, CalendarError};
use crate::config::RotationConfig;
use crate::models::{Assignment, Vehicle};
use crate::pool::{FavoriteSource, PoolError, VehiclePool};
use crate::{log_changes, log_checks, log_debug};

use super::selection::{choose_vehicle, class_preference, ClassSets, DayContext};
use super::state::RotationState;

/// Errors that can occur while generating a calendar.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Invalid range: duration must be a positive number of days, got {0}")]
    InvalidRange(i64),
    #[error("Insufficient vehicles: {0}")]
    InsufficientVehicles(String),
    #[error("Infeasible: no valid assignment for {date} after {attempts} consecutive rollbacks")]
    Infeasible { date: NaiveDate, attempts: u32 },
    #[error("Invalid vehicle pool: {0}")]
    InvalidPool(#[from] PoolError),
}

impl From<CalendarError> for SchedulerError {
    fn from(err: CalendarError) -> Self {
        match err {
            CalendarError::InvalidRange { start, end } => {
                SchedulerError::InvalidRange((end - start).num_days())
            }
        }
    }
}

/// Counters describing how a run got to its result.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RotationStats {
    /// Total rollbacks performed
    pub rollbacks: u32,
    /// Times the used set was cleared after the whole pool had been assigned
    pub rotation_resets: u32,
}

/// Result of a successful run.
#[derive(Clone, Debug)]
pub struct RotationResult {
    pub assignments: Vec<Assignment>,
    pub stats: RotationStats,
}

/// Assigns one vehicle per day under the rotation rules.
pub struct RotationScheduler<'a> {
    pool: &'a VehiclePool,
    config: RotationConfig,
    classes: ClassSets,
}

impl<'a> RotationScheduler<'a> {
    pub fn new(pool: &'a VehiclePool, config: RotationConfig) -> Self {
        Self {
            pool,
            config,
            classes: ClassSets::from_pool(pool),
        }
    }

    fn check_preconditions(&self, duration_days: i64) -> Result<(), SchedulerError> {
        if duration_days <= 0 {
            return Err(SchedulerError::InvalidRange(duration_days));
        }
        if self.pool.is_empty() {
            return Err(SchedulerError::InsufficientVehicles(
                "vehicle pool is empty".to_string(),
            ));
        }
        let manufacturers = self.pool.distinct_manufacturers();
        if manufacturers < 2 {
            return Err(SchedulerError::InsufficientVehicles(format!(
                "need vehicles from at least 2 manufacturers, found {}",
                manufacturers
            )));
        }
        Ok(())
    }

    /// Run with a random source seeded from the config (or the OS when unset).
    pub fn run_seeded(
        &self,
        start_date: NaiveDate,
        duration_days: i64,
    ) -> Result<RotationResult, SchedulerError> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        self.run(start_date, duration_days, &mut rng)
    }

    /// Run over the half-open range `[start_date, end_date)`.
    pub fn run_between<R: Rng + ?Sized>(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        rng: &mut R,
    ) -> Result<RotationResult, SchedulerError> {
        let duration_days = duration_between(start_date, end_date)?;
        self.run(start_date, duration_days, rng)
    }

    /// Assign a vehicle to every date in `[start_date, start_date + duration_days)`.
    ///
    /// The random source is the only source of nondeterminism: the same pool,
    /// range and draw sequence always produce the same calendar.
    pub fn run<R: Rng + ?Sized>(
        &self,
        start_date: NaiveDate,
        duration_days: i64,
        rng: &mut R,
    ) -> Result<RotationResult, SchedulerError> {
        self.check_preconditions(duration_days)?;

        let end_date = start_date
            .checked_add_days(Days::new(duration_days as u64))
            .ok_or(SchedulerError::InvalidRange(duration_days))?;
        let last_day = end_date - Days::new(1);
        let verbosity = self.config.verbosity;

        // Read the favorite designation once for the whole run
        let favorites: Vec<usize> = self
            .pool
            .favorite_ids()
            .into_iter()
            .filter_map(|id| self.pool.index_of(id))
            .collect();

        let mut state = RotationState::new(start_date, duration_days as usize);
        let mut stats = RotationStats::default();
        let mut furthest = start_date;
        let mut consecutive_rollbacks: u32 = 0;

        while state.cursor() < end_date {
            let cursor = state.cursor();
            let blocked_manufacturer = state.prev_manufacturer();

            let week = state.week_so_far();
            let (favorites_spent, favorites_pending): (Vec<usize>, Vec<usize>) = favorites
                .iter()
                .copied()
                .partition(|&fav| week.iter().any(|day| day.vehicle == fav));

            // A favorite already assigned this week cannot rejoin the rotation
            // until Sunday, so it does not hold the epoch open
            if state.reset_if_exhausted(self.pool.len(), &favorites_spent) {
                stats.rotation_resets += 1;
                log_changes!(verbosity, "  Rotation reset at {}: every vehicle used", cursor);
            }

            let ctx = DayContext {
                pool: self.pool,
                used: state.used(),
                blocked_manufacturer,
                favorites_pending: &favorites_pending,
                favorites_spent: &favorites_spent,
            };

            let selected = if ctx.available().is_empty() {
                log_checks!(verbosity, "  {}: no vehicle available, dead end", cursor);
                None
            } else {
                let order = class_preference(cursor);
                match ctx.preferred_candidates(&order, &self.classes) {
                    Some((class, candidates)) => {
                        log_checks!(
                            verbosity,
                            "  {}: choosing among {} {} candidates (favorite pending: {})",
                            cursor,
                            candidates.len(),
                            class,
                            !favorites_pending.is_empty()
                        );
                        choose_vehicle(&candidates, rng)
                    }
                    None => None,
                }
            };

            // Closing the week is only valid once no favorite is still pending
            let favorite_satisfied = favorites_pending.iter().all(|&fav| Some(fav) == selected);
            let closes_week = is_saturday(cursor) || cursor == last_day;
            let favorite_missed = closes_week && !favorite_satisfied;

            match selected {
                Some(idx) if !favorite_missed => {
                    let vehicle = self.pool.vehicle(idx);
                    state.commit(idx, self.pool.manufacturer_of(idx));
                    log_changes!(verbosity, "Assigned {}: {}", cursor, vehicle);

                    if state.cursor() > furthest {
                        furthest = state.cursor();
                        consecutive_rollbacks = 0;
                    }
                }
                _ => {
                    if consecutive_rollbacks >= self.config.max_rollbacks {
                        return Err(SchedulerError::Infeasible {
                            date: cursor,
                            attempts: consecutive_rollbacks,
                        });
                    }
                    consecutive_rollbacks += 1;
                    stats.rollbacks += 1;

                    let target = rollback_target(cursor, start_date, self.config.rollback_days);
                    let discarded = state.rollback_to(target);
                    log_changes!(
                        verbosity,
                        "Rollback at {} ({}): back to {}, discarded {} days",
                        cursor,
                        if favorite_missed {
                            "favorite missing this week"
                        } else {
                            "dead end"
                        },
                        target,
                        discarded
                    );
                    log_debug!(
                        verbosity,
                        "  Restored: {} used, previous manufacturer {:?}",
                        state.used().len(),
                        state
                            .prev_manufacturer()
                            .and_then(|m| self.pool.manufacturer_name(m))
                    );
                }
            }
        }

        log_changes!(
            verbosity,
            "Generated {} days from {} with {} rollbacks",
            state.len(),
            start_date,
            stats.rollbacks
        );

        Ok(RotationResult {
            assignments: state.into_assignments(self.pool),
            stats,
        })
    }
}

/// `rollback_days` before `cursor`, never earlier than `start_date`.
fn rollback_target(cursor: NaiveDate, start_date: NaiveDate, rollback_days: u32) -> NaiveDate {
    cursor
        .checked_sub_days(Days::new(rollback_days as u64))
        .unwrap_or(start_date)
        .max(start_date)
}

/// Generate a calendar for `vehicles` over `[start_date, start_date + duration_days)`.
pub fn generate<R: Rng + ?Sized>(
    vehicles: &[Vehicle],
    start_date: NaiveDate,
    duration_days: i64,
    rng: &mut R,
) -> Result<Vec<Assignment>, SchedulerError> {
    let pool = VehiclePool::for_rotation(vehicles.iter().cloned())?;
    let scheduler = RotationScheduler::new(&pool, RotationConfig::default());
    Ok(scheduler.run(start_date, duration_days, rng)?.assignments)
}
