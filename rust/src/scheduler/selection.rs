//! Candidate pools and class preference for a single day.

use chrono::NaiveDate;
use rand::seq::IndexedRandom;
use rand::Rng;
use rustc_hash::FxHashSet;

use crate::calendar::is_weekend;
use crate::models::VehicleClass;
use crate::pool::{ManufacturerId, VehiclePool};

const WEEKEND_PREFERENCE: [VehicleClass; 3] =
    [VehicleClass::Fast, VehicleClass::Normal, VehicleClass::Offroad];
const WEEKDAY_PREFERENCE: [VehicleClass; 3] =
    [VehicleClass::Offroad, VehicleClass::Normal, VehicleClass::Fast];

/// Class order tried for a date: fast first on weekends, offroad first on weekdays.
pub fn class_preference(date: NaiveDate) -> [VehicleClass; 3] {
    if is_weekend(date) {
        WEEKEND_PREFERENCE
    } else {
        WEEKDAY_PREFERENCE
    }
}

/// Pool indices partitioned by vehicle class, computed once per run.
#[derive(Clone, Debug, Default)]
pub struct ClassSets {
    fast: Vec<usize>,
    normal: Vec<usize>,
    offroad: Vec<usize>,
}

impl ClassSets {
    pub fn from_pool(pool: &VehiclePool) -> Self {
        Self {
            fast: pool.class_members(VehicleClass::Fast),
            normal: pool.class_members(VehicleClass::Normal),
            offroad: pool.class_members(VehicleClass::Offroad),
        }
    }

    pub fn members(&self, class: VehicleClass) -> &[usize] {
        match class {
            VehicleClass::Fast => &self.fast,
            VehicleClass::Normal => &self.normal,
            VehicleClass::Offroad => &self.offroad,
        }
    }
}

/// Everything needed to compute a day's candidate pools.
pub struct DayContext<'a> {
    pub pool: &'a VehiclePool,
    pub used: &'a FxHashSet<usize>,
    /// Manufacturer of the previous day, excluded today
    pub blocked_manufacturer: Option<ManufacturerId>,
    /// Favorites not yet assigned this week
    pub favorites_pending: &'a [usize],
    /// Favorites already assigned this week
    pub favorites_spent: &'a [usize],
}

impl DayContext<'_> {
    #[inline]
    fn admissible(&self, idx: usize) -> bool {
        Some(self.pool.manufacturer_of(idx)) != self.blocked_manufacturer
            && !self.favorites_spent.contains(&idx)
    }

    /// `((members - used) ∪ pending favorites) - blocked manufacturer`, in
    /// pool order with pending favorites appended.
    fn collect(&self, members: impl Iterator<Item = usize>) -> Vec<usize> {
        let mut out: Vec<usize> = members
            .filter(|idx| !self.used.contains(idx) && self.admissible(*idx))
            .collect();
        for &fav in self.favorites_pending {
            if self.admissible(fav) && !out.contains(&fav) {
                out.push(fav);
            }
        }
        out
    }

    /// Every vehicle that could be assigned today regardless of class.
    pub fn available(&self) -> Vec<usize> {
        self.collect(0..self.pool.len())
    }

    /// Candidates restricted to one class (plus pending favorites).
    pub fn candidates(&self, members: &[usize]) -> Vec<usize> {
        self.collect(members.iter().copied())
    }

    /// First non-empty candidate pool in preference order.
    pub fn preferred_candidates(
        &self,
        order: &[VehicleClass],
        classes: &ClassSets,
    ) -> Option<(VehicleClass, Vec<usize>)> {
        order.iter().find_map(|&class| {
            let candidates = self.candidates(classes.members(class));
            (!candidates.is_empty()).then_some((class, candidates))
        })
    }
}

/// Uniform random pick from a candidate pool.
pub fn choose_vehicle<R: Rng + ?Sized>(candidates: &[usize], rng: &mut R) -> Option<usize> {
    candidates.choose(rng).copied()
}
