//! Configuration types for the rotation scheduler.

use pyo3::prelude::*;

/// Configuration for the rotation scheduler's retry policy and diagnostics.
#[pyclass]
#[derive(Clone, Debug)]
pub struct RotationConfig {
    /// Rollbacks allowed without the cursor reaching a new furthest date
    /// before the run is declared infeasible
    #[pyo3(get, set)]
    pub max_rollbacks: u32,
    /// How far back (in days) a rollback rewinds the cursor, floored at the start date
    #[pyo3(get, set)]
    pub rollback_days: u32,
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug
    #[pyo3(get, set)]
    pub verbosity: u8,
    /// Seed for the random source; None draws one from the OS
    #[pyo3(get, set)]
    pub seed: Option<u64>,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            max_rollbacks: 10_000,
            rollback_days: 13,
            verbosity: 0,
            seed: None,
        }
    }
}

#[pymethods]
impl RotationConfig {
    #[new]
    #[pyo3(signature = (max_rollbacks=None, rollback_days=None, verbosity=None, seed=None))]
    fn new(
        max_rollbacks: Option<u32>,
        rollback_days: Option<u32>,
        verbosity: Option<u8>,
        seed: Option<u64>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            max_rollbacks: max_rollbacks.unwrap_or(defaults.max_rollbacks),
            rollback_days: rollback_days.unwrap_or(defaults.rollback_days),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
            seed,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "RotationConfig(max_rollbacks={}, rollback_days={}, verbosity={}, seed={:?})",
            self.max_rollbacks, self.rollback_days, self.verbosity, self.seed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RotationConfig::default();
        assert_eq!(config.rollback_days, 13);
        assert_eq!(config.verbosity, 0);
        assert!(config.max_rollbacks > 0);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_partial_overrides_keep_defaults() {
        let config = RotationConfig::new(Some(5), None, Some(2), Some(7));
        assert_eq!(config.max_rollbacks, 5);
        assert_eq!(config.rollback_days, 13);
        assert_eq!(config.verbosity, 2);
        assert_eq!(config.seed, Some(7));
    }
}
