//! In-progress rotation state with index-based rollback.

use chrono::{Days, NaiveDate};
use rustc_hash::FxHashSet;

use crate::calendar::week_start;
use crate::models::Assignment;
use crate::pool::{ManufacturerId, VehiclePool};

/// One committed day in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommittedDay {
    pub date: NaiveDate,
    /// Pool index of the assigned vehicle
    pub vehicle: usize,
    pub manufacturer: ManufacturerId,
    /// Arena index at which this day's rotation epoch began
    pub epoch_start: usize,
}

/// Upper bound on the arena's up-front allocation; longer runs grow on demand.
const MAX_PREALLOCATED_DAYS: usize = 366 * 4;

/// Mutable state of a single scheduler run.
///
/// `committed` is append-only between rollbacks and entry `i` is always dated
/// `start_date + i`, so a rollback is a truncation to a day index followed by
/// re-deriving `used` and the previous manufacturer from what is kept.
#[derive(Clone, Debug)]
pub struct RotationState {
    start_date: NaiveDate,
    committed: Vec<CommittedDay>,
    /// Pool indices assigned since the current rotation epoch began
    used: FxHashSet<usize>,
    epoch_start: usize,
}

impl RotationState {
    pub fn new(start_date: NaiveDate, capacity: usize) -> Self {
        Self {
            start_date,
            committed: Vec::with_capacity(capacity.min(MAX_PREALLOCATED_DAYS)),
            used: FxHashSet::default(),
            epoch_start: 0,
        }
    }

    /// The date currently being resolved.
    pub fn cursor(&self) -> NaiveDate {
        self.date_at(self.committed.len())
    }

    fn date_at(&self, index: usize) -> NaiveDate {
        self.start_date + Days::new(index as u64)
    }

    pub fn len(&self) -> usize {
        self.committed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
    }

    pub fn committed(&self) -> &[CommittedDay] {
        &self.committed
    }

    pub fn used(&self) -> &FxHashSet<usize> {
        &self.used
    }

    /// Manufacturer of the most recently committed day.
    pub fn prev_manufacturer(&self) -> Option<ManufacturerId> {
        self.committed.last().map(|day| day.manufacturer)
    }

    /// Start a new rotation epoch once every vehicle in the pool has been used.
    ///
    /// Vehicles in `exempt` (favorites already assigned this week) count as
    /// covered. Returns true if the used set was cleared.
    pub fn reset_if_exhausted(&mut self, pool_len: usize, exempt: &[usize]) -> bool {
        if self.used.is_empty() {
            return false;
        }
        let exhausted =
            (0..pool_len).all(|idx| self.used.contains(&idx) || exempt.contains(&idx));
        if !exhausted {
            return false;
        }
        self.used.clear();
        self.epoch_start = self.committed.len();
        true
    }

    /// Days committed since the Sunday on or before the cursor.
    pub fn week_so_far(&self) -> &[CommittedDay] {
        let sunday = week_start(self.cursor());
        let from = (sunday - self.start_date).num_days().max(0) as usize;
        &self.committed[from.min(self.committed.len())..]
    }

    pub fn commit(&mut self, vehicle: usize, manufacturer: ManufacturerId) {
        let date = self.cursor();
        self.committed.push(CommittedDay {
            date,
            vehicle,
            manufacturer,
            epoch_start: self.epoch_start,
        });
        self.used.insert(vehicle);
    }

    /// Discard every day from `target` onwards and make `target` the cursor.
    ///
    /// Returns the number of discarded days. Targets before the start date are
    /// floored to it.
    pub fn rollback_to(&mut self, target: NaiveDate) -> usize {
        let keep = (target - self.start_date).num_days().max(0) as usize;
        if keep >= self.committed.len() {
            return 0;
        }
        let discarded = self.committed.len() - keep;
        self.committed.truncate(keep);

        self.epoch_start = self.committed.last().map_or(0, |day| day.epoch_start);
        self.used = self.committed[self.epoch_start..]
            .iter()
            .map(|day| day.vehicle)
            .collect();
        discarded
    }

    /// Materialize the committed days as caller-owned assignments.
    pub fn into_assignments(self, pool: &VehiclePool) -> Vec<Assignment> {
        self.committed
            .into_iter()
            .map(|day| Assignment {
                date: day.date,
                vehicle: pool.vehicle(day.vehicle).clone(),
            })
            .collect()
    }
}
