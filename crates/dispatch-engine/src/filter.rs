//! `Filter` (`§4.5`): feature include/exclude, group-suffix selection, and
//! group pattern exclude.

use dispatch_catalog::FeatureRecord;
use dispatch_matcher::PatternSet;
use dispatch_utils::error::PlannerError;
use std::fmt;
use std::str::FromStr;

/// `-g/--group-choice` values (`§6`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupChoice {
    #[default]
    All,
    Crit,
    Full,
    Tmp,
}

impl GroupChoice {
    fn suffix(self) -> Option<&'static str> {
        match self {
            Self::All => None,
            Self::Crit => Some("crit"),
            Self::Full => Some("full"),
            Self::Tmp => Some("tmp"),
        }
    }
}

impl fmt::Display for GroupChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::All => "all",
            Self::Crit => "crit",
            Self::Full => "full",
            Self::Tmp => "tmp",
        };
        f.write_str(s)
    }
}

impl FromStr for GroupChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "crit" => Ok(Self::Crit),
            "full" => Ok(Self::Full),
            "tmp" => Ok(Self::Tmp),
            other => Err(format!("unknown group choice {other:?}")),
        }
    }
}

/// Inputs to the filter pipeline.
#[derive(Debug, Default)]
pub struct FilterConfig {
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub static_exclude: Vec<String>,
    pub group_choice: GroupChoice,
    pub group_exclude_patterns: Vec<String>,
}

/// A feature paired with its surviving groups after the filter pipeline.
#[derive(Debug, Clone)]
pub struct FilteredFeature {
    pub record: FeatureRecord,
    pub groups: Vec<String>,
}

fn compile(patterns: &[String]) -> Result<PatternSet, PlannerError> {
    PatternSet::compile(patterns).map_err(|e| PlannerError::InvalidArgument {
        key: "pattern".to_string(),
        reason: e.to_string(),
    })
}

/// Runs the four-step filter pipeline (`§4.5`).
pub fn apply(
    features: Vec<FeatureRecord>,
    config: &FilterConfig,
) -> Result<Vec<FilteredFeature>, PlannerError> {
    let include = compile(&config.include_patterns)?;
    let mut exclude_all = config.static_exclude.clone();
    exclude_all.extend(config.exclude_patterns.iter().cloned());
    let exclude = compile(&exclude_all)?;
    let group_exclude = compile(&config.group_exclude_patterns)?;

    let included: Vec<FeatureRecord> = if include.is_empty() {
        features
    } else {
        features
            .into_iter()
            .filter(|f| include.matches_any(&f.name))
            .collect()
    };
    if included.is_empty() {
        return Err(PlannerError::NoFeaturesMatched);
    }

    let surviving: Vec<FeatureRecord> = included
        .into_iter()
        .filter(|f| !exclude.matches_any(&f.name))
        .collect();
    if surviving.is_empty() {
        return Err(PlannerError::NoFeaturesMatched);
    }

    let suffix = config.group_choice.suffix();
    let result: Vec<FilteredFeature> = surviving
        .into_iter()
        .filter_map(|record| {
            let groups: Vec<String> = record
                .test_groups
                .iter()
                .filter(|g| suffix.is_none_or(|s| g.ends_with(&format!(".{s}"))))
                .filter(|g| !group_exclude.matches_any(g))
                .cloned()
                .collect();
            if groups.is_empty() {
                None
            } else {
                Some(FilteredFeature { record, groups })
            }
        })
        .collect();

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(name: &str, groups: &[&str]) -> FeatureRecord {
        FeatureRecord {
            name: name.to_string(),
            test_case_folder: vec![],
            test_config: vec![],
            test_groups: groups.iter().map(|s| s.to_string()).collect(),
            docker_compose: vec![],
            email: String::new(),
            provision_vmpc: false,
            vmpc_names: String::new(),
            provision_docker: true,
            oriole_submit_flag: dispatch_catalog::OrioleSubmitFlag::All,
        }
    }

    #[test]
    fn fuzzy_include_wildcard_and_substring() {
        let features = vec![
            feature("antivirus", &["g1"]),
            feature("antispam", &["g1"]),
            feature("webfilter", &["g1"]),
        ];
        let config = FilterConfig {
            include_patterns: vec!["anti*".to_string()],
            ..Default::default()
        };
        let result = apply(features, &config).unwrap();
        let names: Vec<&str> = result.iter().map(|f| f.record.name.as_str()).collect();
        assert_eq!(names, vec!["antivirus", "antispam"]);
    }

    #[test]
    fn substring_include_matches_webfilter() {
        let features = vec![feature("webfilter", &["g1"]), feature("antivirus", &["g1"])];
        let config = FilterConfig {
            include_patterns: vec!["filter".to_string()],
            ..Default::default()
        };
        let result = apply(features, &config).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].record.name, "webfilter");
    }

    #[test]
    fn empty_inclusion_result_fails() {
        let features = vec![feature("antivirus", &["g1"])];
        let config = FilterConfig {
            include_patterns: vec!["nomatch*".to_string()],
            ..Default::default()
        };
        let err = apply(features, &config).unwrap_err();
        assert!(matches!(err, PlannerError::NoFeaturesMatched));
    }

    #[test]
    fn group_suffix_filter_reduces_groups() {
        let features = vec![feature(
            "antivirus",
            &["basic.crit", "basic.full", "basic.tmp"],
        )];
        let config = FilterConfig {
            group_choice: GroupChoice::Crit,
            ..Default::default()
        };
        let result = apply(features, &config).unwrap();
        assert_eq!(result[0].groups, vec!["basic.crit"]);
    }

    #[test]
    fn feature_with_no_surviving_groups_is_dropped() {
        let features = vec![feature("antivirus", &["basic.full"])];
        let config = FilterConfig {
            group_choice: GroupChoice::Crit,
            ..Default::default()
        };
        let result = apply(features, &config).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn group_pattern_exclude_removes_matching_groups() {
        let features = vec![feature("antivirus", &["g1", "g2"])];
        let config = FilterConfig {
            group_exclude_patterns: vec!["g2".to_string()],
            ..Default::default()
        };
        let result = apply(features, &config).unwrap();
        assert_eq!(result[0].groups, vec!["g1"]);
    }

    #[test]
    fn static_exclude_list_drops_features() {
        let features = vec![feature("antivirus", &["g1"]), feature("antispam", &["g1"])];
        let config = FilterConfig {
            static_exclude: vec!["antispam".to_string()],
            ..Default::default()
        };
        let result = apply(features, &config).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].record.name, "antivirus");
    }
}
