//! Error taxonomy for the dispatch planner.
//!
//! Mirrors the error categories in the design (`§7 Error Handling Design`):
//! per-record input defects are recovered locally (skip + warn), while
//! configuration and authorization failures surface to the caller.

use thiserror::Error;

/// Top-level error type returned by every planner component.
#[derive(Error, Debug)]
pub enum PlannerError {
    /// An external source (catalog HTTP endpoint, duration store, live
    /// inventory) failed outright. The caller may retry with a configured
    /// fallback source.
    #[error("source unavailable: {source_name}: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    /// Credentials were rejected by an external source (401/403).
    #[error("unauthorized accessing {source_name}")]
    Unauthorized { source_name: String },

    /// A record could not be parsed into a known shape. Non-fatal unless it
    /// empties the result set; the caller decides.
    #[error("malformed input in {location}: {reason}")]
    MalformedInput { location: String, reason: String },

    /// The feature include/exclude pipeline left no surviving features.
    #[error("no features matched the configured include/exclude patterns")]
    NoFeaturesMatched,

    /// The node pool resolver produced an empty available set.
    #[error("no nodes available after applying reservations and exclusions")]
    NoNodes,

    /// `definedSpec ∩ live` was empty when both were configured.
    #[error("defined node pool and live inventory do not intersect")]
    EmptyIntersection,

    /// Neither a defined node pool nor the live inventory were configured.
    #[error("no node source configured: set --nodes or --use-jenkins-nodes")]
    NoSource,

    /// Two static bindings claimed the same node.
    #[error("node {node} is statically bound to both {first_feature} and {second_feature}")]
    StaticConflict {
        node: String,
        first_feature: String,
        second_feature: String,
    },

    /// The dynamic placement phase ran out of nodes mid-feature. Warned,
    /// not fatal: callers record this and continue.
    #[error("ran out of dynamic nodes while placing {feature}: {skipped_bins} bin(s) skipped")]
    InsufficientNodes { feature: String, skipped_bins: usize },

    #[error("invalid CLI argument {key}: {reason}")]
    InvalidArgument { key: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Buckets errors for exit-code mapping and log-level selection, mirroring
/// the taxonomy's split between fatal configuration errors and recoverable
/// per-record defects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Input/config problem the operator must fix.
    Configuration,
    /// Upstream collaborator (HTTP endpoint, doc store, controller) failed.
    ExternalSource,
    /// Recoverable per-record defect, already downgraded to a warning.
    Recoverable,
    /// Anything else (I/O, serialization).
    Internal,
}

/// Human-facing presentation for a `PlannerError`, in the teacher's
/// `user_message`/`context`/`suggestions` idiom.
pub trait UserFriendlyError {
    /// A short, human-readable summary suitable for a single terminal line.
    fn user_message(&self) -> String;

    /// Additional context beyond the summary (what was being attempted).
    fn context(&self) -> Option<String>;

    /// Actionable next steps the operator can take.
    fn suggestions(&self) -> Vec<String>;

    /// Coarse bucket for exit-code mapping.
    fn category(&self) -> ErrorCategory;
}

impl UserFriendlyError for PlannerError {
    fn user_message(&self) -> String {
        match self {
            Self::SourceUnavailable { source_name, .. } => {
                format!("Could not reach {source_name}")
            }
            Self::Unauthorized { source_name } => {
                format!("Credentials rejected by {source_name}")
            }
            Self::MalformedInput { location, .. } => {
                format!("Skipped unparseable record in {location}")
            }
            Self::NoFeaturesMatched => "No features survived filtering".to_string(),
            Self::NoNodes => "No nodes available to dispatch to".to_string(),
            Self::EmptyIntersection => "Defined nodes and live inventory do not overlap".to_string(),
            Self::NoSource => "No node source configured".to_string(),
            Self::StaticConflict { node, .. } => format!("Node {node} is bound twice"),
            Self::InsufficientNodes { feature, .. } => {
                format!("Ran out of nodes while placing {feature}")
            }
            Self::InvalidArgument { key, .. } => format!("Invalid value for {key}"),
            Self::Io(e) => format!("I/O error: {e}"),
            Self::Json(e) => format!("JSON error: {e}"),
            Self::Http(e) => format!("HTTP error: {e}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::SourceUnavailable { reason, .. } => Some(reason.clone()),
            Self::MalformedInput { reason, .. } => Some(reason.clone()),
            Self::StaticConflict {
                first_feature,
                second_feature,
                ..
            } => Some(format!("claimed by {first_feature} and {second_feature}")),
            Self::InsufficientNodes { skipped_bins, .. } => {
                Some(format!("{skipped_bins} bin(s) skipped"))
            }
            Self::InvalidArgument { reason, .. } => Some(reason.clone()),
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::SourceUnavailable { .. } => vec![
                "Check network connectivity to the source".to_string(),
                "Configure a fallback file source".to_string(),
            ],
            Self::Unauthorized { .. } => vec![
                "Verify --api-token/--api-user/--api-pass".to_string(),
                "Configure a fallback source without authentication".to_string(),
            ],
            Self::NoFeaturesMatched => vec![
                "Relax --features/--exclude patterns".to_string(),
                "Verify the catalog source contains the expected features".to_string(),
            ],
            Self::NoNodes => vec![
                "Widen --nodes or disable --reserved-nodes/--exclude-nodes".to_string(),
            ],
            Self::EmptyIntersection => vec![
                "Ensure --nodes overlaps with the live Jenkins inventory".to_string(),
            ],
            Self::NoSource => vec![
                "Pass --nodes or --use-jenkins-nodes".to_string(),
            ],
            Self::StaticConflict { .. } => vec![
                "Remove the duplicate static binding for this node".to_string(),
            ],
            Self::InsufficientNodes { .. } => vec![
                "Add more nodes to the pool or reduce feature count".to_string(),
            ],
            _ => vec![],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::SourceUnavailable { .. } | Self::Unauthorized { .. } => {
                ErrorCategory::ExternalSource
            }
            Self::MalformedInput { .. } | Self::InsufficientNodes { .. } => {
                ErrorCategory::Recoverable
            }
            Self::NoFeaturesMatched
            | Self::NoNodes
            | Self::EmptyIntersection
            | Self::NoSource
            | Self::StaticConflict { .. }
            | Self::InvalidArgument { .. } => ErrorCategory::Configuration,
            Self::Io(_) | Self::Json(_) | Self::Http(_) => ErrorCategory::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_are_categorized() {
        let err = PlannerError::NoNodes;
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(!err.user_message().is_empty());
    }

    #[test]
    fn static_conflict_carries_both_features() {
        let err = PlannerError::StaticConflict {
            node: "node28".to_string(),
            first_feature: "antivirus".to_string(),
            second_feature: "antispam".to_string(),
        };
        assert!(err.context().unwrap().contains("antispam"));
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn insufficient_nodes_is_recoverable() {
        let err = PlannerError::InsufficientNodes {
            feature: "webfilter".to_string(),
            skipped_bins: 2,
        };
        assert_eq!(err.category(), ErrorCategory::Recoverable);
    }
}
