use camino::{Utf8Path, Utf8PathBuf};
use dispatch_utils::error::PlannerError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{
    CatalogConfig, CliArgs, Config, ConfigSource, DurationConfig, FilterSettings, NodePoolConfig,
    OutputConfig, StaticBindingsConfig, SubmitOverridesConfig,
};

const CONFIG_DIR_NAME: &str = ".dispatch";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Shape of `.dispatch/config.toml`: every section mirrors a piece of
/// [`Config`], all optional so a partial file only overrides what it names.
#[derive(Debug, Default, Deserialize, Serialize)]
struct TomlConfig {
    catalog: Option<CatalogConfig>,
    duration: Option<DurationConfig>,
    nodes: Option<NodePoolConfig>,
    filter: Option<FilterSettings>,
    output: Option<OutputConfig>,
    administrators: Option<Vec<String>>,
    static_bindings: Option<StaticBindingsConfig>,
    submit_overrides: Option<SubmitOverridesConfig>,
}

impl Config {
    /// Discovers and loads configuration with precedence CLI > file > defaults,
    /// searching for a config file from the current working directory.
    pub fn discover(cli_args: &CliArgs) -> Result<Self, PlannerError> {
        let start_dir = std::env::current_dir().map_err(|e| PlannerError::SourceUnavailable {
            source_name: "current directory".to_string(),
            reason: e.to_string(),
        })?;
        let start_dir = Utf8PathBuf::from_path_buf(start_dir).map_err(|p| PlannerError::MalformedInput {
            location: "current directory".to_string(),
            reason: format!("{} is not valid UTF-8", p.display()),
        })?;
        Self::discover_from(&start_dir, cli_args)
    }

    /// Path-driven variant of [`Config::discover`], used by tests to avoid
    /// depending on the process's current directory.
    pub fn discover_from(start_dir: &Utf8Path, cli_args: &CliArgs) -> Result<Self, PlannerError> {
        let mut source_attribution = HashMap::new();

        let mut catalog = CatalogConfig::default();
        let mut duration = DurationConfig::default();
        let mut nodes = NodePoolConfig::default();
        let mut filter = FilterSettings::default();
        let mut output = OutputConfig::default();
        let mut administrators = Vec::new();
        let mut static_bindings = StaticBindingsConfig::default();
        let mut submit_overrides = SubmitOverridesConfig::default();

        source_attribution.insert("filter.group_choice".to_string(), ConfigSource::Default);

        let config_path = if let Some(explicit_path) = &cli_args.config_path {
            Some(explicit_path.clone())
        } else {
            Self::discover_config_file_from(start_dir)?
        };

        if let Some(path) = &config_path {
            let file_config = Self::load_config_file(path)?;
            let source = ConfigSource::ConfigFile(path.clone());

            if let Some(file_catalog) = file_config.catalog {
                catalog = file_catalog;
                source_attribution.insert("catalog".to_string(), source.clone());
            }
            if let Some(file_duration) = file_config.duration {
                duration = file_duration;
                source_attribution.insert("duration".to_string(), source.clone());
            }
            if let Some(file_nodes) = file_config.nodes {
                nodes = file_nodes;
                source_attribution.insert("nodes".to_string(), source.clone());
            }
            if let Some(file_filter) = file_config.filter {
                filter = file_filter;
                source_attribution.insert("filter".to_string(), source.clone());
            }
            if let Some(file_output) = file_config.output {
                output = file_output;
                source_attribution.insert("output".to_string(), source.clone());
            }
            if let Some(file_admins) = file_config.administrators {
                administrators = file_admins;
                source_attribution.insert("administrators".to_string(), source.clone());
            }
            if let Some(file_bindings) = file_config.static_bindings {
                static_bindings = file_bindings;
                source_attribution.insert("static_bindings".to_string(), source.clone());
            }
            if let Some(file_overrides) = file_config.submit_overrides {
                submit_overrides = file_overrides;
                source_attribution.insert("submit_overrides".to_string(), source);
            }
        }

        // CLI overrides, highest priority.
        if let Some(feature_list) = &cli_args.feature_list {
            catalog.feature_list = Some(feature_list.clone());
            source_attribution.insert("catalog.feature_list".to_string(), ConfigSource::Cli);
        }
        if let Some(api_url) = &cli_args.api_url {
            catalog.api_url = Some(api_url.clone());
            source_attribution.insert("catalog.api_url".to_string(), ConfigSource::Cli);
        }
        if cli_args.no_api {
            catalog.no_api = true;
            source_attribution.insert("catalog.no_api".to_string(), ConfigSource::Cli);
        }
        if let Some(user) = &cli_args.api_user {
            catalog.api_user = Some(user.clone());
            source_attribution.insert("catalog.api_user".to_string(), ConfigSource::Cli);
        }
        if let Some(pass) = &cli_args.api_pass {
            catalog.api_pass = Some(pass.clone());
            source_attribution.insert("catalog.api_pass".to_string(), ConfigSource::Cli);
        }
        if let Some(token) = &cli_args.api_token {
            catalog.api_token = Some(token.clone());
            source_attribution.insert("catalog.api_token".to_string(), ConfigSource::Cli);
        }

        if let Some(durations) = &cli_args.durations {
            duration.durations = Some(durations.clone());
            source_attribution.insert("duration.durations".to_string(), ConfigSource::Cli);
        }
        if let Some(uri) = &cli_args.mongo_uri {
            duration.mongo_uri = Some(uri.clone());
            source_attribution.insert("duration.mongo_uri".to_string(), ConfigSource::Cli);
        }
        if let Some(db) = &cli_args.mongo_db {
            duration.mongo_db = Some(db.clone());
            source_attribution.insert("duration.mongo_db".to_string(), ConfigSource::Cli);
        }
        if let Some(collection) = &cli_args.mongo_collection {
            duration.mongo_collection = Some(collection.clone());
            source_attribution.insert("duration.mongo_collection".to_string(), ConfigSource::Cli);
        }
        if let Some(release) = &cli_args.release {
            duration.release = Some(release.clone());
            source_attribution.insert("duration.release".to_string(), ConfigSource::Cli);
        }
        if cli_args.no_mongo {
            duration.no_mongo = true;
            source_attribution.insert("duration.no_mongo".to_string(), ConfigSource::Cli);
        }

        if let Some(spec) = &cli_args.nodes {
            nodes.nodes = Some(spec.clone());
            source_attribution.insert("nodes.nodes".to_string(), ConfigSource::Cli);
        }
        if cli_args.use_jenkins_nodes {
            nodes.use_jenkins_nodes = true;
            source_attribution.insert("nodes.use_jenkins_nodes".to_string(), ConfigSource::Cli);
        }
        if !cli_args.exclude_nodes.is_empty() {
            nodes.exclude_nodes = cli_args.exclude_nodes.clone();
            source_attribution.insert("nodes.exclude_nodes".to_string(), ConfigSource::Cli);
        }
        if !cli_args.reserved_nodes.is_empty() {
            nodes.reserved_nodes = cli_args.reserved_nodes.clone();
            source_attribution.insert("nodes.reserved_nodes".to_string(), ConfigSource::Cli);
        }

        if !cli_args.features.is_empty() {
            filter.features = cli_args.features.clone();
            source_attribution.insert("filter.features".to_string(), ConfigSource::Cli);
        }
        if !cli_args.exclude.is_empty() {
            filter.exclude = cli_args.exclude.clone();
            source_attribution.insert("filter.exclude".to_string(), ConfigSource::Cli);
        }
        if let Some(group_choice) = &cli_args.group_choice {
            filter.group_choice = Some(group_choice.clone());
            source_attribution.insert("filter.group_choice".to_string(), ConfigSource::Cli);
        }
        if !cli_args.group_filter.is_empty() {
            filter.group_filter = cli_args.group_filter.clone();
            source_attribution.insert("filter.group_filter".to_string(), ConfigSource::Cli);
        }

        if let Some(path) = &cli_args.output {
            output.path = Some(path.clone());
            source_attribution.insert("output.path".to_string(), ConfigSource::Cli);
        }

        let config = Self {
            catalog,
            duration,
            nodes,
            filter,
            output,
            administrators,
            static_bindings,
            submit_overrides,
            source_attribution,
        };

        config.validate()?;

        Ok(config)
    }

    /// Walks up from `start_dir` looking for `.dispatch/config.toml`,
    /// stopping at a `.git`/`.hg`/`.svn` repository root marker or the
    /// filesystem root.
    pub fn discover_config_file_from(
        start_dir: &Utf8Path,
    ) -> Result<Option<Utf8PathBuf>, PlannerError> {
        let mut current_dir = start_dir.to_path_buf();

        loop {
            let config_path = current_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Ok(Some(config_path));
            }

            if current_dir.parent().is_none() {
                break;
            }
            if current_dir.join(".git").exists()
                || current_dir.join(".hg").exists()
                || current_dir.join(".svn").exists()
            {
                break;
            }

            current_dir = current_dir.parent().unwrap().to_path_buf();
        }

        Ok(None)
    }

    fn load_config_file(path: &Utf8Path) -> Result<TomlConfig, PlannerError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| PlannerError::MalformedInput {
                location: format!("config file {path}"),
                reason: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(TomlConfig::default()),
            Err(e) => Err(PlannerError::SourceUnavailable {
                source_name: format!("config file {path}"),
                reason: e.to_string(),
            }),
        }
    }

    /// Discovers configuration from the filesystem alone, equivalent to
    /// [`Config::discover`] with no CLI overrides. Convenient for library
    /// consumers that don't construct a [`CliArgs`].
    pub fn discover_from_env_and_fs() -> Result<Self, PlannerError> {
        Self::discover(&CliArgs::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let start = Utf8Path::from_path(dir.path()).unwrap();
        let cli = CliArgs {
            feature_list: Some(start.join("features.json")),
            no_api: true,
            durations: Some(start.join("durations.json")),
            no_mongo: true,
            nodes: Some("node1".to_string()),
            output: Some(start.join("dispatch.json")),
            ..Default::default()
        };
        let config = Config::discover_from(start, &cli).unwrap();
        assert_eq!(config.filter.group_choice, None);
        assert_eq!(
            config.source_attribution.get("catalog.feature_list"),
            Some(&ConfigSource::Cli)
        );
    }

    #[test]
    fn config_file_values_are_overridden_by_cli() {
        let dir = tempdir().unwrap();
        let start = Utf8Path::from_path(dir.path()).unwrap();
        fs::create_dir_all(start.join(CONFIG_DIR_NAME)).unwrap();
        fs::write(
            start.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME),
            r#"
            [catalog]
            feature_list = "from-file.json"
            no_api = true

            [duration]
            durations = "from-file-durations.json"
            no_mongo = true

            [nodes]
            nodes = "node1"

            [output]
            path = "from-file.json"
            "#,
        )
        .unwrap();

        let cli = CliArgs {
            feature_list: Some(start.join("from-cli.json")),
            ..Default::default()
        };
        let config = Config::discover_from(start, &cli).unwrap();
        assert_eq!(config.catalog.feature_list, Some(start.join("from-cli.json")));
        assert_eq!(
            config.source_attribution.get("catalog.feature_list"),
            Some(&ConfigSource::Cli)
        );
        assert_eq!(config.output.path, Some(Utf8PathBuf::from("from-file.json")));
    }

    #[test]
    fn discovery_stops_at_repository_root() {
        let dir = tempdir().unwrap();
        let start = Utf8Path::from_path(dir.path()).unwrap();
        fs::create_dir_all(start.join(".git")).unwrap();
        let nested = start.join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let found = Config::discover_config_file_from(&nested).unwrap();
        assert_eq!(found, None);
    }
}
