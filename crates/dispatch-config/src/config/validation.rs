use dispatch_engine::filter::GroupChoice;
use dispatch_utils::error::PlannerError;
use std::str::FromStr;

use super::Config;

impl Config {
    /// Validates the merged configuration before it is handed to the engine.
    /// Per-field numeric/enum bounds only; cross-source conflicts that the
    /// pipeline itself already reports (`NoSource`, `EmptyIntersection`,
    /// `NoNodes`) are left to `NodePoolResolver::resolve`.
    pub(crate) fn validate(&self) -> Result<(), PlannerError> {
        if self.catalog.feature_list.is_none() && (self.catalog.no_api || self.catalog.api_url.is_none()) {
            return Err(PlannerError::InvalidArgument {
                key: "catalog".to_string(),
                reason: "neither --feature-list nor --api-url is configured".to_string(),
            });
        }

        if self.duration.durations.is_none()
            && (self.duration.no_mongo || self.duration.mongo_uri.is_none())
        {
            return Err(PlannerError::InvalidArgument {
                key: "duration".to_string(),
                reason: "neither --durations nor --mongo-uri is configured".to_string(),
            });
        }

        if self.nodes.nodes.is_none() && !self.nodes.use_jenkins_nodes {
            return Err(PlannerError::InvalidArgument {
                key: "nodes".to_string(),
                reason: "neither --nodes nor --use-jenkins-nodes is configured".to_string(),
            });
        }

        if let Some(choice) = &self.filter.group_choice {
            GroupChoice::from_str(choice).map_err(|reason| PlannerError::InvalidArgument {
                key: "filter.group_choice".to_string(),
                reason,
            })?;
        }

        if self
            .output
            .path
            .as_ref()
            .is_some_and(|p| p.as_str().is_empty())
        {
            return Err(PlannerError::InvalidArgument {
                key: "output.path".to_string(),
                reason: "output path must not be empty".to_string(),
            });
        }

        self.submit_overrides.to_submit_overrides()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::{CatalogConfig, DurationConfig, NodePoolConfig, OutputConfig};
    use super::*;

    fn valid_config() -> Config {
        Config {
            catalog: CatalogConfig {
                feature_list: Some("features.json".into()),
                no_api: true,
                ..Default::default()
            },
            duration: DurationConfig {
                durations: Some("durations.json".into()),
                no_mongo: true,
                ..Default::default()
            },
            nodes: NodePoolConfig {
                nodes: Some("node1-node2".to_string()),
                ..Default::default()
            },
            output: OutputConfig {
                path: Some("dispatch.json".into()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn minimal_valid_config_passes() {
        valid_config().validate().unwrap();
    }

    #[test]
    fn rejects_no_catalog_source() {
        let mut config = valid_config();
        config.catalog.feature_list = None;
        config.catalog.no_api = false;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, PlannerError::InvalidArgument { .. }));
    }

    #[test]
    fn rejects_no_node_source() {
        let mut config = valid_config();
        config.nodes.nodes = None;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, PlannerError::InvalidArgument { .. }));
    }

    #[test]
    fn rejects_unknown_group_choice() {
        let mut config = valid_config();
        config.filter.group_choice = Some("bogus".to_string());
        let err = config.validate().unwrap_err();
        assert!(matches!(err, PlannerError::InvalidArgument { .. }));
    }

    #[test]
    fn rejects_unknown_submit_override_flag() {
        let mut config = valid_config();
        config
            .submit_overrides
            .0
            .insert("antivirus".to_string(), "bogus".to_string());
        let err = config.validate().unwrap_err();
        assert!(matches!(err, PlannerError::InvalidArgument { .. }));
    }
}
