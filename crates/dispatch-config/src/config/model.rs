use camino::Utf8PathBuf;
use dispatch_engine::filter::{FilterConfig, GroupChoice};
use dispatch_engine::{PlannerConfig, SubmitOverrides};
use dispatch_http::Credentials;
use dispatch_catalog::{CatalogSource, OrioleSubmitFlag};
use dispatch_utils::error::PlannerError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Where a single configuration value ultimately came from (`§6`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Cli,
    ConfigFile(Utf8PathBuf),
    Programmatic,
    Default,
}

/// Where the feature catalog is fetched from.
///
/// Exactly one of a file path or an HTTP endpoint should be configured; see
/// [`Config::validate`](super::validation). `--no-api` forces the file path
/// even when `api_url` is also present.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CatalogConfig {
    pub feature_list: Option<Utf8PathBuf>,
    pub api_url: Option<String>,
    #[serde(default)]
    pub no_api: bool,
    pub api_user: Option<String>,
    pub api_pass: Option<String>,
    pub api_token: Option<String>,
}

/// Where historical test-group durations are fetched from.
///
/// The duration document store is reached over HTTP (`§4.3`); there is no
/// mongo driver in this stack, so `mongo_uri` names the base URL of that
/// HTTP front, with `mongo_db`/`mongo_collection` appended as path segments.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DurationConfig {
    pub durations: Option<Utf8PathBuf>,
    pub mongo_uri: Option<String>,
    pub mongo_db: Option<String>,
    pub mongo_collection: Option<String>,
    pub release: Option<String>,
    #[serde(default)]
    pub no_mongo: bool,
}

impl DurationConfig {
    /// Composes the doc-store query URL, or `None` if no mongo endpoint is
    /// configured.
    #[must_use]
    pub fn query_url(&self) -> Option<String> {
        let uri = self.mongo_uri.as_deref()?;
        let db = self.mongo_db.as_deref().unwrap_or("durations");
        let collection = self.mongo_collection.as_deref().unwrap_or("observations");
        Some(format!("{}/{db}/{collection}", uri.trim_end_matches('/')))
    }
}

/// Node pool definition: either a defined spec, live Jenkins discovery, or
/// both, intersected (`§4.4`).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NodePoolConfig {
    pub nodes: Option<String>,
    #[serde(default)]
    pub use_jenkins_nodes: bool,
    pub jenkins_url: Option<String>,
    pub jenkins_user: Option<String>,
    pub jenkins_pass: Option<String>,
    #[serde(default)]
    pub exclude_nodes: Vec<String>,
    #[serde(default)]
    pub reserved_nodes: Vec<String>,
}

/// Feature/group filter settings (`-f`, `-e`, `-g`, `--group-filter`, `§6`).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FilterSettings {
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub static_exclude: Vec<String>,
    pub group_choice: Option<String>,
    #[serde(default)]
    pub group_filter: Vec<String>,
}

impl FilterSettings {
    pub fn to_filter_config(&self) -> Result<FilterConfig, PlannerError> {
        let group_choice = match &self.group_choice {
            Some(s) => GroupChoice::from_str(s).map_err(|reason| PlannerError::InvalidArgument {
                key: "filter.group_choice".to_string(),
                reason,
            })?,
            None => GroupChoice::default(),
        };
        Ok(FilterConfig {
            include_patterns: self.features.clone(),
            exclude_patterns: self.exclude.clone(),
            static_exclude: self.static_exclude.clone(),
            group_choice,
            group_exclude_patterns: self.group_filter.clone(),
        })
    }
}

/// Dispatch output destination (`-o`, `§6`).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    pub path: Option<Utf8PathBuf>,
    #[serde(default)]
    pub mirror_paths: Vec<Utf8PathBuf>,
}

/// `[static_bindings]` table: feature name -> ordered list of bound nodes.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StaticBindingsConfig(pub HashMap<String, Vec<String>>);

/// `[submit_overrides]` table: feature name -> `ORIOLE_SUBMIT_FLAG` string.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SubmitOverridesConfig(pub HashMap<String, String>);

impl SubmitOverridesConfig {
    pub fn to_submit_overrides(&self) -> Result<SubmitOverrides, PlannerError> {
        self.0
            .iter()
            .map(|(feature, flag)| {
                OrioleSubmitFlag::from_str(flag)
                    .map(|parsed| (feature.clone(), parsed))
                    .map_err(|()| PlannerError::InvalidArgument {
                        key: format!("submit_overrides.{feature}"),
                        reason: format!("unknown oriole submit flag {flag:?}"),
                    })
            })
            .collect()
    }
}

/// Dispatch planner configuration, assembled with CLI > config file > defaults
/// precedence. Each setting's origin is tracked in `source_attribution` for
/// status display (`§6`).
///
/// # Discovery
///
/// Use [`Config::discover()`](super::discovery) to search upward from the
/// current directory for `.dispatch/config.toml`, merge it under CLI
/// overrides, and apply built-in defaults to anything left unset.
///
/// # Programmatic configuration
///
/// For embedding scenarios that need deterministic behavior independent of
/// the caller's environment, use [`ConfigBuilder`](super::builder::ConfigBuilder).
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub duration: DurationConfig,
    pub nodes: NodePoolConfig,
    pub filter: FilterSettings,
    pub output: OutputConfig,
    pub administrators: Vec<String>,
    pub static_bindings: StaticBindingsConfig,
    pub submit_overrides: SubmitOverridesConfig,
    pub source_attribution: HashMap<String, ConfigSource>,
}

impl Config {
    /// Resolves the configured catalog source. `--no-api`/`no_api` forces the
    /// file path even if an API URL is also configured.
    pub fn catalog_source(&self) -> Result<CatalogSource, PlannerError> {
        if !self.catalog.no_api {
            if let Some(url) = &self.catalog.api_url {
                return Ok(CatalogSource::Http {
                    url: url.clone(),
                    credentials: Credentials {
                        token: self.catalog.api_token.clone(),
                        user: self.catalog.api_user.clone(),
                        pass: self.catalog.api_pass.clone(),
                    },
                });
            }
        }
        self.catalog
            .feature_list
            .clone()
            .map(CatalogSource::File)
            .ok_or_else(|| PlannerError::InvalidArgument {
                key: "catalog".to_string(),
                reason: "neither --feature-list nor --api-url is configured".to_string(),
            })
    }

    /// The catalog file to fall back to if the primary source (the HTTP
    /// endpoint) is unavailable (`§4.1`, `§6`'s `-l/--feature-list`
    /// "catalog file path (fallback)"). `None` when the primary source is
    /// already the file itself, or no fallback file is configured.
    #[must_use]
    pub fn catalog_fallback_source(&self) -> Option<CatalogSource> {
        let is_http_primary = !self.catalog.no_api && self.catalog.api_url.is_some();
        if !is_http_primary {
            return None;
        }
        self.catalog.feature_list.clone().map(CatalogSource::File)
    }

    /// Assembles the engine-facing [`PlannerConfig`], independent of the
    /// external source implementations the caller still needs to construct
    /// (the `HttpClient`, `DurationSource`, and `LiveNodeInventory`).
    pub fn to_planner_config(&self) -> Result<PlannerConfig, PlannerError> {
        Ok(PlannerConfig {
            catalog_source: self.catalog_source()?,
            catalog_fallback: self.catalog_fallback_source(),
            administrators: self.administrators.clone(),
            defined_node_spec: self.nodes.nodes.clone(),
            use_live_nodes: self.nodes.use_jenkins_nodes,
            reserved_nodes: self.nodes.reserved_nodes.clone(),
            excluded_nodes: self.nodes.exclude_nodes.clone(),
            release: self.duration.release.clone(),
            filter: self.filter.to_filter_config()?,
            static_bindings: self.static_bindings.0.clone(),
            submit_overrides: self.submit_overrides.to_submit_overrides()?,
            output_path: self.output.path.clone().ok_or_else(|| PlannerError::InvalidArgument {
                key: "output.path".to_string(),
                reason: "no dispatch output path configured".to_string(),
            })?,
            mirror_paths: self.output.mirror_paths.clone(),
        })
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Config {
    /// A minimal `Config` suitable for unit tests: a file-backed catalog and
    /// duration source, no live nodes, and an output path under `path`.
    #[must_use]
    pub fn minimal_for_testing(dir: &camino::Utf8Path) -> Self {
        Self {
            catalog: CatalogConfig {
                feature_list: Some(dir.join("features.json")),
                no_api: true,
                ..Default::default()
            },
            duration: DurationConfig {
                durations: Some(dir.join("durations.json")),
                no_mongo: true,
                ..Default::default()
            },
            nodes: NodePoolConfig {
                nodes: Some("node1-node2".to_string()),
                ..Default::default()
            },
            output: OutputConfig {
                path: Some(dir.join("dispatch.json")),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}
