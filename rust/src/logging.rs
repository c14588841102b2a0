//! Logging macros for the rotation scheduler with verbosity level control.
//!
//! Provides zero-cost logging when disabled (verbosity=0).
//! Verbosity levels match the Python side's logger:
//! - 0: SILENT (only errors)
//! - 1: CHANGES (committed days, rollbacks, rotation resets)
//! - 2: CHECKS (candidate pools considered for a day)
//! - 3: DEBUG (full algorithm internals)

/// Verbosity level constants.
pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_CHANGES: u8 = 1;
pub const VERBOSITY_CHECKS: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// Log at CHANGES level (verbosity >= 1).
///
/// Used for: committed assignments, rollbacks, rotation resets.
#[macro_export]
macro_rules! log_changes {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHANGES {
            eprintln!($($arg)*);
        }
    };
}

/// Log at CHECKS level (verbosity >= 2).
///
/// Used for: class preference walk, candidate pool sizes, favorite status.
#[macro_export]
macro_rules! log_checks {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHECKS {
            eprintln!($($arg)*);
        }
    };
}

/// Log at DEBUG level (verbosity >= 3).
///
/// Used for: state restoration details after a rollback.
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_DEBUG {
            eprintln!($($arg)*);
        }
    };
}
