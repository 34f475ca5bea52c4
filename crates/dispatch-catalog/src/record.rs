//! The canonical `FeatureRecord` entity (`§3`) and its submit-flag enum.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// `orioleSubmitFlag` values (`§3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrioleSubmitFlag {
    All,
    Succeeded,
    None,
}

impl Default for OrioleSubmitFlag {
    fn default() -> Self {
        Self::All
    }
}

impl fmt::Display for OrioleSubmitFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::All => "all",
            Self::Succeeded => "succeeded",
            Self::None => "none",
        };
        f.write_str(s)
    }
}

impl FromStr for OrioleSubmitFlag {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "succeeded" => Ok(Self::Succeeded),
            "none" => Ok(Self::None),
            _ => Err(()),
        }
    }
}

/// A feature as it exists after `CatalogLoader` normalization and
/// `FeatureMerger` merging — the canonical, immutable entity the rest of the
/// pipeline operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRecord {
    pub name: String,
    pub test_case_folder: Vec<String>,
    pub test_config: Vec<String>,
    pub test_groups: Vec<String>,
    pub docker_compose: Vec<String>,
    /// Single comma-joined, lexicographically sorted email string, always
    /// including the administrator set when any email is present anywhere.
    pub email: String,
    pub provision_vmpc: bool,
    pub vmpc_names: String,
    pub provision_docker: bool,
    pub oriole_submit_flag: OrioleSubmitFlag,
}

impl FeatureRecord {
    #[must_use]
    pub fn first_test_case_folder(&self) -> Option<&str> {
        self.test_case_folder.first().map(String::as_str)
    }

    #[must_use]
    pub fn first_test_config(&self) -> Option<&str> {
        self.test_config.first().map(String::as_str)
    }

    #[must_use]
    pub fn first_docker_compose(&self) -> Option<&str> {
        self.docker_compose.first().map(String::as_str)
    }
}

/// Append `value` to `into` if it is not already present (first-seen order).
pub(crate) fn dedup_push(into: &mut Vec<String>, value: String) {
    if !into.contains(&value) {
        into.push(value);
    }
}
