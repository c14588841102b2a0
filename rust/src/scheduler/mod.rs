//! Rotation scheduler: one vehicle per day with bounded rollback.
//!
//! Days are resolved in date order from a randomized candidate pool; when a
//! day cannot be resolved, or a week closes without its favorite, the run
//! rewinds up to two weeks and retries with fresh draws.

mod core;
mod selection;
mod state;

pub use core::{generate, RotationResult, RotationScheduler, RotationStats, SchedulerError};
pub use selection::{class_preference, ClassSets};
pub use state::{CommittedDay, RotationState};
