//! Foundation utilities shared across the dispatch planner crates.

pub mod atomic_write;
pub mod error;
pub mod exit_codes;
pub mod logging;

pub use error::{ErrorCategory, PlannerError, UserFriendlyError};
pub use exit_codes::ExitCode;
