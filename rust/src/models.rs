//! Core data types for the rotation calendar.

use chrono::NaiveDate;
use pyo3::prelude::*;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Stable vehicle identity (the storage primary key on the Python side).
pub type VehicleId = u32;

/// Errors raised while building model values from external input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Unknown vehicle class: {0:?} (expected fast, normal or offroad)")]
    UnknownVehicleClass(String),
}

/// Vehicle class used for weekday/weekend preference.
#[pyclass(eq, eq_int)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VehicleClass {
    Fast,
    Normal,
    Offroad,
}

impl VehicleClass {
    /// Lowercase name used in storage and forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Normal => "normal",
            Self::Offroad => "offroad",
        }
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleClass {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "normal" => Ok(Self::Normal),
            "offroad" => Ok(Self::Offroad),
            _ => Err(ModelError::UnknownVehicleClass(s.to_string())),
        }
    }
}

/// A vehicle that can be assigned to a day.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct Vehicle {
    #[pyo3(get, set)]
    pub id: VehicleId,
    #[pyo3(get, set)]
    pub manufacturer: String,
    #[pyo3(get, set)]
    pub model: String,
    #[pyo3(get, set)]
    pub vehicle_class: VehicleClass,
    /// Tri-state flag: `Some(true)` marks the favorite, `Some(false)` and
    /// `None` both mean "not favorite".
    #[pyo3(get, set)]
    pub is_favorite: Option<bool>,
}

impl Vehicle {
    /// Create a non-favorite vehicle.
    pub fn new(
        id: VehicleId,
        manufacturer: impl Into<String>,
        model: impl Into<String>,
        vehicle_class: VehicleClass,
    ) -> Self {
        Self {
            id,
            manufacturer: manufacturer.into(),
            model: model.into(),
            vehicle_class,
            is_favorite: None,
        }
    }

    /// Builder-style helper for marking a vehicle as the favorite.
    pub fn favorite(mut self) -> Self {
        self.is_favorite = Some(true);
        self
    }

    #[inline]
    pub fn is_favorite(&self) -> bool {
        self.is_favorite == Some(true)
    }
}

impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}",
            self.manufacturer, self.model, self.vehicle_class
        )
    }
}

#[pymethods]
impl Vehicle {
    #[new]
    #[pyo3(signature = (id, manufacturer, model, vehicle_class, is_favorite=None))]
    fn py_new(
        id: VehicleId,
        manufacturer: String,
        model: String,
        vehicle_class: &str,
        is_favorite: Option<bool>,
    ) -> PyResult<Self> {
        let vehicle_class = vehicle_class
            .parse::<VehicleClass>()
            .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))?;
        Ok(Self {
            id,
            manufacturer,
            model,
            vehicle_class,
            is_favorite,
        })
    }

    fn __str__(&self) -> String {
        self.to_string()
    }

    fn __repr__(&self) -> String {
        format!(
            "Vehicle(id={}, manufacturer={:?}, model={:?}, vehicle_class={:?}, is_favorite={:?})",
            self.id,
            self.manufacturer,
            self.model,
            self.vehicle_class.as_str(),
            self.is_favorite
        )
    }
}

/// One day of the calendar: the vehicle assigned to a date.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    #[pyo3(get)]
    pub date: NaiveDate,
    #[pyo3(get)]
    pub vehicle: Vehicle,
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.date, self.vehicle)
    }
}

#[pymethods]
impl Assignment {
    #[new]
    fn py_new(date: NaiveDate, vehicle: Vehicle) -> Self {
        Self { date, vehicle }
    }

    fn __str__(&self) -> String {
        self.to_string()
    }

    fn __repr__(&self) -> String {
        format!(
            "Assignment(date={}, vehicle_id={})",
            self.date, self.vehicle.id
        )
    }
}
