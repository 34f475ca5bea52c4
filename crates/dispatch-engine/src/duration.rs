//! `FeatureDuration` (`§3`): per-feature total estimated seconds, derived
//! after filtering.

use crate::filter::FilteredFeature;
use dispatch_duration::DurationStore;
use std::collections::HashMap;

/// Missing-group default applied when a selected group has no historical
/// observation (`§4.3`).
pub const MISSING_GROUP_SECONDS: u64 = 3600;

#[derive(Debug, Clone)]
pub struct FeatureDuration {
    pub feature: String,
    pub per_group_seconds: HashMap<String, u64>,
    pub total_seconds: u64,
}

/// Joins each filtered feature's surviving groups with the duration store,
/// substituting `MISSING_GROUP_SECONDS` for any group with no observation.
#[must_use]
pub fn compute_durations(
    filtered: &[FilteredFeature],
    store: &DurationStore,
) -> Vec<FeatureDuration> {
    filtered
        .iter()
        .map(|f| {
            let per_group_seconds: HashMap<String, u64> = f
                .groups
                .iter()
                .map(|g| {
                    let seconds = store
                        .seconds_for(&f.record.name, g)
                        .unwrap_or(MISSING_GROUP_SECONDS);
                    (g.clone(), seconds)
                })
                .collect();
            let total_seconds = f
                .groups
                .iter()
                .map(|g| per_group_seconds[g])
                .sum();
            FeatureDuration {
                feature: f.record.name.clone(),
                per_group_seconds,
                total_seconds,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilteredFeature;
    use async_trait::async_trait;
    use dispatch_catalog::{FeatureRecord, OrioleSubmitFlag};
    use dispatch_duration::observation::DurationObservation;
    use dispatch_duration::DurationSource;
    use dispatch_utils::error::PlannerError;

    struct StaticSource(Vec<DurationObservation>);

    #[async_trait]
    impl DurationSource for StaticSource {
        async fn fetch(
            &self,
            _release: Option<&str>,
        ) -> Result<Vec<DurationObservation>, PlannerError> {
            Ok(self.0.clone())
        }
    }

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
            oriole_submit_flag: OrioleSubmitFlag::All,
        }
    }

    fn obs(feature: &str, group: &str, seconds: u64) -> DurationObservation {
        DurationObservation {
            feature: feature.to_string(),
            group: group.to_string(),
            human_duration: String::new(),
            seconds,
            release: None,
            build: 1,
            timestamp: None,
        }
    }

    #[tokio::test]
    async fn missing_group_defaults_to_one_hour() {
        let source = StaticSource(vec![obs("antivirus", "g1", 100)]);
        let store = DurationStore::load(&source, None, None).await;
        let filtered = vec![FilteredFeature {
            record: feature("antivirus", &["g1", "g2"]),
            groups: vec!["g1".to_string(), "g2".to_string()],
        }];
        let durations = compute_durations(&filtered, &store);
        assert_eq!(durations[0].per_group_seconds["g1"], 100);
        assert_eq!(durations[0].per_group_seconds["g2"], MISSING_GROUP_SECONDS);
        assert_eq!(durations[0].total_seconds, 100 + MISSING_GROUP_SECONDS);
    }
}
