//! Exit code constants and error mapping for the dispatch planner.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Dispatch plan produced (possibly with warnings) |
//! | 1 | `PLANNING_FAILED` | No features matched, no nodes available, or a source was unreachable |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments |

use crate::error::{ErrorCategory, PlannerError, UserFriendlyError};

/// Exit codes matching the documented exit code table.
///
/// This is a stable public type; the numeric values are part of the public
/// API and will not change in 1.x releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const PLANNING_FAILED: ExitCode = ExitCode(1);
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    pub const fn as_i32(self) -> i32 {
        self.0
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

impl From<&PlannerError> for ExitCode {
    fn from(err: &PlannerError) -> Self {
        match err.category() {
            ErrorCategory::Configuration | ErrorCategory::ExternalSource => {
                if matches!(err, PlannerError::InvalidArgument { .. }) {
                    ExitCode::CLI_ARGS
                } else {
                    ExitCode::PLANNING_FAILED
                }
            }
            ErrorCategory::Recoverable => ExitCode::SUCCESS,
            ErrorCategory::Internal => ExitCode::PLANNING_FAILED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_nodes_maps_to_planning_failed() {
        let err = PlannerError::NoNodes;
        assert_eq!(ExitCode::from(&err), ExitCode::PLANNING_FAILED);
    }

    #[test]
    fn invalid_argument_maps_to_cli_args() {
        let err = PlannerError::InvalidArgument {
            key: "--nodes".to_string(),
            reason: "empty range".to_string(),
        };
        assert_eq!(ExitCode::from(&err), ExitCode::CLI_ARGS);
    }

    #[test]
    fn insufficient_nodes_does_not_fail_the_run() {
        let err = PlannerError::InsufficientNodes {
            feature: "antivirus".to_string(),
            skipped_bins: 1,
        };
        assert_eq!(ExitCode::from(&err), ExitCode::SUCCESS);
    }

    #[test]
    fn success_is_zero() {
        assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
    }
}
