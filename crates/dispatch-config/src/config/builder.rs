use camino::Utf8PathBuf;
use dispatch_utils::error::PlannerError;
use std::collections::HashMap;

use super::{
    CatalogConfig, Config, ConfigSource, DurationConfig, FilterSettings, NodePoolConfig,
    OutputConfig, StaticBindingsConfig, SubmitOverridesConfig,
};

impl Config {
    /// Creates a builder for programmatic configuration, for embedding
    /// scenarios that need deterministic behavior independent of CLI
    /// arguments or the filesystem.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Fluent builder for a [`Config`]. Every value set through the builder is
/// attributed to `ConfigSource::Programmatic` in the resulting config.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    feature_list: Option<Utf8PathBuf>,
    api_url: Option<String>,
    api_user: Option<String>,
    api_pass: Option<String>,
    api_token: Option<String>,
    durations: Option<Utf8PathBuf>,
    mongo_uri: Option<String>,
    mongo_db: Option<String>,
    mongo_collection: Option<String>,
    release: Option<String>,
    nodes: Option<String>,
    use_jenkins_nodes: bool,
    exclude_nodes: Vec<String>,
    reserved_nodes: Vec<String>,
    features: Vec<String>,
    exclude: Vec<String>,
    group_choice: Option<String>,
    group_filter: Vec<String>,
    output_path: Option<Utf8PathBuf>,
    mirror_paths: Vec<Utf8PathBuf>,
    administrators: Vec<String>,
    static_bindings: HashMap<String, Vec<String>>,
    submit_overrides: HashMap<String, String>,
}

impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn feature_list(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.feature_list = Some(path.into());
        self
    }

    #[must_use]
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn api_credentials(
        mut self,
        user: impl Into<String>,
        pass: impl Into<String>,
    ) -> Self {
        self.api_user = Some(user.into());
        self.api_pass = Some(pass.into());
        self
    }

    #[must_use]
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn durations(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.durations = Some(path.into());
        self
    }

    #[must_use]
    pub fn mongo(
        mut self,
        uri: impl Into<String>,
        db: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        self.mongo_uri = Some(uri.into());
        self.mongo_db = Some(db.into());
        self.mongo_collection = Some(collection.into());
        self
    }

    #[must_use]
    pub fn release(mut self, release: impl Into<String>) -> Self {
        self.release = Some(release.into());
        self
    }

    #[must_use]
    pub fn nodes(mut self, spec: impl Into<String>) -> Self {
        self.nodes = Some(spec.into());
        self
    }

    #[must_use]
    pub fn use_jenkins_nodes(mut self, enabled: bool) -> Self {
        self.use_jenkins_nodes = enabled;
        self
    }

    #[must_use]
    pub fn exclude_nodes(mut self, nodes: Vec<String>) -> Self {
        self.exclude_nodes = nodes;
        self
    }

    #[must_use]
    pub fn reserved_nodes(mut self, nodes: Vec<String>) -> Self {
        self.reserved_nodes = nodes;
        self
    }

    #[must_use]
    pub fn features(mut self, patterns: Vec<String>) -> Self {
        self.features = patterns;
        self
    }

    #[must_use]
    pub fn exclude(mut self, patterns: Vec<String>) -> Self {
        self.exclude = patterns;
        self
    }

    #[must_use]
    pub fn group_choice(mut self, choice: impl Into<String>) -> Self {
        self.group_choice = Some(choice.into());
        self
    }

    #[must_use]
    pub fn group_filter(mut self, patterns: Vec<String>) -> Self {
        self.group_filter = patterns;
        self
    }

    #[must_use]
    pub fn output(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn mirror_paths(mut self, paths: Vec<Utf8PathBuf>) -> Self {
        self.mirror_paths = paths;
        self
    }

    #[must_use]
    pub fn administrators(mut self, admins: Vec<String>) -> Self {
        self.administrators = admins;
        self
    }

    #[must_use]
    pub fn static_binding(mut self, feature: impl Into<String>, nodes: Vec<String>) -> Self {
        self.static_bindings.insert(feature.into(), nodes);
        self
    }

    #[must_use]
    pub fn submit_override(mut self, feature: impl Into<String>, flag: impl Into<String>) -> Self {
        self.submit_overrides.insert(feature.into(), flag.into());
        self
    }

    /// Builds and validates the `Config`.
    pub fn build(self) -> Result<Config, PlannerError> {
        let mut source_attribution = HashMap::new();
        let mut mark = |key: &str| {
            source_attribution.insert(key.to_string(), ConfigSource::Programmatic);
        };

        let catalog = CatalogConfig {
            feature_list: self.feature_list.clone(),
            api_url: self.api_url.clone(),
            no_api: self.api_url.is_none(),
            api_user: self.api_user,
            api_pass: self.api_pass,
            api_token: self.api_token,
        };
        if self.feature_list.is_some() {
            mark("catalog.feature_list");
        }
        if catalog.api_url.is_some() {
            mark("catalog.api_url");
        }

        let duration = DurationConfig {
            durations: self.durations.clone(),
            mongo_uri: self.mongo_uri.clone(),
            mongo_db: self.mongo_db,
            mongo_collection: self.mongo_collection,
            release: self.release,
            no_mongo: self.mongo_uri.is_none(),
        };
        if self.durations.is_some() {
            mark("duration.durations");
        }
        if duration.mongo_uri.is_some() {
            mark("duration.mongo_uri");
        }

        let nodes = NodePoolConfig {
            nodes: self.nodes.clone(),
            use_jenkins_nodes: self.use_jenkins_nodes,
            jenkins_url: None,
            jenkins_user: None,
            jenkins_pass: None,
            exclude_nodes: self.exclude_nodes,
            reserved_nodes: self.reserved_nodes,
        };
        if self.nodes.is_some() {
            mark("nodes.nodes");
        }
        if nodes.use_jenkins_nodes {
            mark("nodes.use_jenkins_nodes");
        }

        let filter = FilterSettings {
            features: self.features,
            exclude: self.exclude,
            static_exclude: Vec::new(),
            group_choice: self.group_choice,
            group_filter: self.group_filter,
        };
        if filter.group_choice.is_some() {
            mark("filter.group_choice");
        }

        let output = OutputConfig {
            path: self.output_path.clone(),
            mirror_paths: self.mirror_paths,
        };
        if self.output_path.is_some() {
            mark("output.path");
        }

        if !self.administrators.is_empty() {
            mark("administrators");
        }
        if !self.static_bindings.is_empty() {
            mark("static_bindings");
        }
        if !self.submit_overrides.is_empty() {
            mark("submit_overrides");
        }

        let config = Config {
            catalog,
            duration,
            nodes,
            filter,
            output,
            administrators: self.administrators,
            static_bindings: StaticBindingsConfig(self.static_bindings),
            submit_overrides: SubmitOverridesConfig(self.submit_overrides),
            source_attribution,
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_produces_programmatic_attribution() {
        let config = Config::builder()
            .feature_list("features.json")
            .durations("durations.json")
            .nodes("node1")
            .output("dispatch.json")
            .build()
            .unwrap();
        assert_eq!(
            config.source_attribution.get("catalog.feature_list"),
            Some(&ConfigSource::Programmatic)
        );
    }

    #[test]
    fn builder_rejects_missing_node_source() {
        let result = Config::builder()
            .feature_list("features.json")
            .durations("durations.json")
            .output("dispatch.json")
            .build();
        assert!(result.is_err());
    }
}
