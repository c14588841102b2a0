//! The vehicle pool: candidate vehicles, class partitions and the favorite designation.
//!
//! Vehicles are addressed internally by their index in the pool (`usize`),
//! which stays stable for the lifetime of the pool since vehicles are only
//! ever appended.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::models::{Vehicle, VehicleClass, VehicleId};

/// Interned manufacturer ID, so the no-repeat rule compares integers.
pub type ManufacturerId = u32;

/// Errors raised by pool construction and favorite transfer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("Vehicle not found: {0}")]
    VehicleNotFound(VehicleId),
    #[error("Duplicate vehicle id: {0}")]
    DuplicateVehicle(VehicleId),
    #[error("Vehicle {candidate} cannot be added as favorite while {current} is the favorite")]
    MultipleFavorites {
        current: VehicleId,
        candidate: VehicleId,
    },
}

/// Read-only access to the favorite designation.
///
/// The scheduler queries this once per run; transferring the designation is
/// a separate operation on [`VehiclePool`].
pub trait FavoriteSource {
    /// Every vehicle currently flagged favorite, normally zero or one.
    fn favorite_ids(&self) -> Vec<VehicleId>;

    fn current_favorite(&self) -> Option<VehicleId> {
        self.favorite_ids().first().copied()
    }
}

/// Maps manufacturer names to dense integer IDs.
#[derive(Clone, Debug, Default)]
struct ManufacturerInterner {
    to_int: FxHashMap<String, ManufacturerId>,
    from_int: Vec<String>,
}

impl ManufacturerInterner {
    fn intern(&mut self, name: &str) -> ManufacturerId {
        if let Some(&id) = self.to_int.get(name) {
            return id;
        }
        let id = self.from_int.len() as ManufacturerId;
        self.from_int.push(name.to_string());
        self.to_int.insert(name.to_string(), id);
        id
    }

    fn resolve(&self, id: ManufacturerId) -> Option<&str> {
        self.from_int.get(id as usize).map(|s| s.as_str())
    }

    fn len(&self) -> usize {
        self.from_int.len()
    }
}

/// The full set of vehicles available for rotation.
#[derive(Clone, Debug, Default)]
pub struct VehiclePool {
    vehicles: Vec<Vehicle>,
    by_id: FxHashMap<VehicleId, usize>,
    manufacturers: ManufacturerInterner,
    /// Interned manufacturer per vehicle index
    manufacturer_ids: Vec<ManufacturerId>,
}

impl VehiclePool {
    /// Build a pool, rejecting duplicate ids and more than one favorite.
    ///
    /// This is the vehicle-management path; see [`VehiclePool::for_rotation`]
    /// for scheduling input.
    pub fn new(vehicles: impl IntoIterator<Item = Vehicle>) -> Result<Self, PoolError> {
        let mut pool = Self::default();
        for vehicle in vehicles {
            pool.insert(vehicle)?;
        }
        Ok(pool)
    }

    /// Build a pool for scheduling: only duplicate ids are rejected, any
    /// number of favorites is accepted.
    pub fn for_rotation(vehicles: impl IntoIterator<Item = Vehicle>) -> Result<Self, PoolError> {
        let mut pool = Self::default();
        for vehicle in vehicles {
            pool.push(vehicle)?;
        }
        Ok(pool)
    }

    /// Add a vehicle, returning its pool index.
    pub fn insert(&mut self, vehicle: Vehicle) -> Result<usize, PoolError> {
        if vehicle.is_favorite() {
            if let Some(current) = self.current_favorite() {
                return Err(PoolError::MultipleFavorites {
                    current,
                    candidate: vehicle.id,
                });
            }
        }
        self.push(vehicle)
    }

    fn push(&mut self, vehicle: Vehicle) -> Result<usize, PoolError> {
        if self.by_id.contains_key(&vehicle.id) {
            return Err(PoolError::DuplicateVehicle(vehicle.id));
        }
        let idx = self.vehicles.len();
        self.manufacturer_ids
            .push(self.manufacturers.intern(&vehicle.manufacturer));
        self.by_id.insert(vehicle.id, idx);
        self.vehicles.push(vehicle);
        Ok(idx)
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Vehicle at a pool index.
    #[inline]
    pub fn vehicle(&self, idx: usize) -> &Vehicle {
        &self.vehicles[idx]
    }

    pub fn get(&self, id: VehicleId) -> Option<&Vehicle> {
        self.index_of(id).map(|idx| &self.vehicles[idx])
    }

    pub fn index_of(&self, id: VehicleId) -> Option<usize> {
        self.by_id.get(&id).copied()
    }

    /// Pool indices of every vehicle flagged favorite.
    ///
    /// Normally zero or one entry; callers must not assume more than that.
    pub fn favorites(&self) -> Vec<usize> {
        self.vehicles
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_favorite())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Pool indices of the vehicles in one class, in insertion order.
    pub fn class_members(&self, class: VehicleClass) -> Vec<usize> {
        self.vehicles
            .iter()
            .enumerate()
            .filter(|(_, v)| v.vehicle_class == class)
            .map(|(idx, _)| idx)
            .collect()
    }

    #[inline]
    pub fn manufacturer_of(&self, idx: usize) -> ManufacturerId {
        self.manufacturer_ids[idx]
    }

    pub fn manufacturer_name(&self, id: ManufacturerId) -> Option<&str> {
        self.manufacturers.resolve(id)
    }

    pub fn distinct_manufacturers(&self) -> usize {
        self.manufacturers.len()
    }

    /// Transfer the favorite designation to `target`.
    ///
    /// When `old_favorite` is given only that vehicle is cleared, otherwise
    /// every currently flagged vehicle is. Both ids are checked before
    /// anything is mutated, so a failed call leaves the pool untouched.
    pub fn make_favorite(
        &mut self,
        target: VehicleId,
        old_favorite: Option<VehicleId>,
    ) -> Result<(), PoolError> {
        let target_idx = self
            .index_of(target)
            .ok_or(PoolError::VehicleNotFound(target))?;

        let to_clear = match old_favorite {
            Some(old) => vec![self.index_of(old).ok_or(PoolError::VehicleNotFound(old))?],
            None => self.favorites(),
        };

        for idx in to_clear {
            self.vehicles[idx].is_favorite = None;
        }
        self.vehicles[target_idx].is_favorite = Some(true);
        Ok(())
    }
}

impl FavoriteSource for VehiclePool {
    fn favorite_ids(&self) -> Vec<VehicleId> {
        self.vehicles
            .iter()
            .filter(|v| v.is_favorite())
            .map(|v| v.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pool() -> VehiclePool {
        VehiclePool::new(vec![
            Vehicle::new(1, "Porsche", "GT3", VehicleClass::Fast).favorite(),
            Vehicle::new(2, "Jeep", "Wrangler", VehicleClass::Offroad),
            Vehicle::new(3, "Toyota", "Corolla", VehicleClass::Normal),
            Vehicle::new(4, "Porsche", "Cayenne", VehicleClass::Offroad),
        ])
        .unwrap()
    }

    #[test]
    fn test_partitions_and_manufacturers() {
        let pool = sample_pool();
        assert_eq!(pool.len(), 4);
        assert_eq!(pool.class_members(VehicleClass::Offroad), vec![1, 3]);
        assert_eq!(pool.class_members(VehicleClass::Fast), vec![0]);
        assert_eq!(pool.distinct_manufacturers(), 3);
        assert_eq!(pool.manufacturer_of(0), pool.manufacturer_of(3));
        assert_eq!(
            pool.manufacturer_name(pool.manufacturer_of(1)),
            Some("Jeep")
        );
    }

    #[test]
    fn test_current_favorite() {
        let pool = sample_pool();
        assert_eq!(pool.current_favorite(), Some(1));
        assert_eq!(pool.favorites(), vec![0]);
    }

    #[test]
    fn test_rejects_second_favorite() {
        let mut pool = sample_pool();
        let err = pool
            .insert(Vehicle::new(5, "Lada", "Niva", VehicleClass::Offroad).favorite())
            .unwrap_err();
        assert_eq!(
            err,
            PoolError::MultipleFavorites {
                current: 1,
                candidate: 5
            }
        );
        assert_eq!(pool.len(), 4);
    }

    #[test]
    fn test_rotation_pool_accepts_several_favorites() {
        let pool = VehiclePool::for_rotation(vec![
            Vehicle::new(1, "Porsche", "GT3", VehicleClass::Fast).favorite(),
            Vehicle::new(2, "Jeep", "Wrangler", VehicleClass::Offroad).favorite(),
            Vehicle::new(3, "Toyota", "Corolla", VehicleClass::Normal),
        ])
        .unwrap();
        assert_eq!(pool.favorite_ids(), vec![1, 2]);
        assert_eq!(pool.current_favorite(), Some(1));

        let dup = VehiclePool::for_rotation(vec![
            Vehicle::new(1, "Porsche", "GT3", VehicleClass::Fast),
            Vehicle::new(1, "Jeep", "Wrangler", VehicleClass::Offroad),
        ]);
        assert_eq!(dup.unwrap_err(), PoolError::DuplicateVehicle(1));
    }

    #[test]
    fn test_same_manufacturer_shares_id() {
        let pool = VehiclePool::new(vec![
            Vehicle::new(1, "bmw", "M3", VehicleClass::Fast),
            Vehicle::new(2, "BMW", "X5", VehicleClass::Offroad),
            Vehicle::new(3, "bmw", "i3", VehicleClass::Normal),
        ])
        .unwrap();
        assert_eq!(pool.manufacturer_of(0), pool.manufacturer_of(2));
        assert_ne!(pool.manufacturer_of(0), pool.manufacturer_of(1));
        assert_eq!(pool.distinct_manufacturers(), 2);
    }

    #[test]
    fn test_rejects_duplicate_id() {
        let result = VehiclePool::new(vec![
            Vehicle::new(1, "Porsche", "GT3", VehicleClass::Fast),
            Vehicle::new(1, "Jeep", "Wrangler", VehicleClass::Offroad),
        ]);
        assert_eq!(result.unwrap_err(), PoolError::DuplicateVehicle(1));
    }

    #[test]
    fn test_make_favorite_transfers_flag() {
        let mut pool = sample_pool();
        pool.make_favorite(3, None).unwrap();

        assert_eq!(pool.current_favorite(), Some(3));
        assert_eq!(pool.get(1).unwrap().is_favorite, None);
        assert_eq!(pool.favorites().len(), 1);

        // Transfer back naming the old favorite explicitly
        pool.make_favorite(1, Some(3)).unwrap();
        assert_eq!(pool.current_favorite(), Some(1));
        assert!(!pool.get(3).unwrap().is_favorite());
    }

    #[test]
    fn test_make_favorite_without_existing_favorite() {
        let mut pool = VehiclePool::new(vec![
            Vehicle::new(1, "Porsche", "GT3", VehicleClass::Fast),
            Vehicle::new(2, "Jeep", "Wrangler", VehicleClass::Offroad),
        ])
        .unwrap();
        assert_eq!(pool.current_favorite(), None);

        pool.make_favorite(2, None).unwrap();
        assert_eq!(pool.current_favorite(), Some(2));
    }

    #[test]
    fn test_make_favorite_unknown_ids_leave_pool_untouched() {
        let mut pool = sample_pool();
        assert_eq!(
            pool.make_favorite(99, None),
            Err(PoolError::VehicleNotFound(99))
        );
        assert_eq!(
            pool.make_favorite(3, Some(42)),
            Err(PoolError::VehicleNotFound(42))
        );
        assert_eq!(pool.current_favorite(), Some(1));
    }
}
