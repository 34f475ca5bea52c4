use std::collections::HashMap;

use super::{Config, ConfigSource};

fn stable_source_label(source: &ConfigSource) -> &'static str {
    match source {
        ConfigSource::Cli => "cli",
        ConfigSource::ConfigFile(_) => "config",
        ConfigSource::Programmatic => "programmatic",
        ConfigSource::Default => "default",
    }
}

fn source_label(source: Option<&ConfigSource>) -> String {
    match source {
        Some(src) => stable_source_label(src).to_string(),
        None => stable_source_label(&ConfigSource::Default).to_string(),
    }
}

impl Config {
    /// Effective configuration as key-value pairs with source attribution,
    /// for status display.
    #[must_use]
    pub fn effective_config(&self) -> HashMap<String, (String, String)> {
        let mut effective = HashMap::new();

        let mut add = |key: &str, value: String| {
            let source = source_label(self.source_attribution.get(key));
            effective.insert(key.to_string(), (value, source));
        };

        if let Some(path) = &self.catalog.feature_list {
            add("catalog.feature_list", path.to_string());
        }
        if let Some(url) = &self.catalog.api_url {
            add("catalog.api_url", url.clone());
        }
        add("catalog.no_api", self.catalog.no_api.to_string());

        if let Some(path) = &self.duration.durations {
            add("duration.durations", path.to_string());
        }
        if let Some(uri) = &self.duration.mongo_uri {
            add("duration.mongo_uri", uri.clone());
        }
        add("duration.no_mongo", self.duration.no_mongo.to_string());

        if let Some(spec) = &self.nodes.nodes {
            add("nodes.nodes", spec.clone());
        }
        add(
            "nodes.use_jenkins_nodes",
            self.nodes.use_jenkins_nodes.to_string(),
        );
        add("nodes.exclude_nodes", self.nodes.exclude_nodes.join(", "));
        add(
            "nodes.reserved_nodes",
            self.nodes.reserved_nodes.join(", "),
        );

        add("filter.features", self.filter.features.join(", "));
        add("filter.exclude", self.filter.exclude.join(", "));
        add(
            "filter.group_choice",
            self.filter
                .group_choice
                .clone()
                .unwrap_or_else(|| "all".to_string()),
        );
        add("filter.group_filter", self.filter.group_filter.join(", "));

        if let Some(path) = &self.output.path {
            add("output.path", path.to_string());
        }

        effective
    }
}
