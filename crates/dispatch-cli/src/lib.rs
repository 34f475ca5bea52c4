//! Command-line interface for the dispatch planner.
//!
//! Parses `§6`'s flag surface with `clap`, discovers configuration through
//! `dispatch-config`, wires the external source implementations, and runs
//! the pipeline via `dispatch-engine`.

use camino::Utf8PathBuf;
use clap::Parser;
use dispatch_catalog::CatalogLoader;
use dispatch_config::{CliArgs, Config};
use dispatch_duration::{DocStoreSource, DurationSource, FileDurationSource};
use dispatch_http::HttpClient;
use dispatch_nodes::JenkinsLiveInventory;
use dispatch_utils::error::{PlannerError, UserFriendlyError};
use dispatch_utils::{logging, ExitCode};
use tracing::error;

/// dispatch-planner - computes a test-workload dispatch plan across a node pool.
#[derive(Parser, Debug, Default)]
#[command(name = "dispatch-planner")]
#[command(about = "Computes a test-workload dispatch plan across a pool of nodes")]
#[command(version)]
pub struct Cli {
    /// Path to a config file (overrides discovery of `.dispatch/config.toml`)
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    /// Enable verbose logging
    #[arg(long)]
    pub verbose: bool,

    /// Feature catalog file, used when `--api-url` is absent or `--no-api` is set
    #[arg(short = 'l', long)]
    pub feature_list: Option<Utf8PathBuf>,

    /// Feature catalog HTTP endpoint
    #[arg(long)]
    pub api_url: Option<String>,

    /// Force the file-backed catalog even if `--api-url` is configured
    #[arg(long)]
    pub no_api: bool,

    /// Username for the catalog HTTP endpoint
    #[arg(long)]
    pub api_user: Option<String>,

    /// Password for the catalog HTTP endpoint
    #[arg(long)]
    pub api_pass: Option<String>,

    /// Bearer token for the catalog HTTP endpoint
    #[arg(long)]
    pub api_token: Option<String>,

    /// Historical duration JSON file, used as a fallback or when `--no-mongo` is set
    #[arg(short = 'd', long)]
    pub durations: Option<Utf8PathBuf>,

    /// Duration document store endpoint (base URL)
    #[arg(long)]
    pub mongo_uri: Option<String>,

    /// Duration document store database name
    #[arg(long)]
    pub mongo_db: Option<String>,

    /// Duration document store collection name
    #[arg(long)]
    pub mongo_collection: Option<String>,

    /// Release name used to scope duration lookups
    #[arg(long)]
    pub release: Option<String>,

    /// Force the file-backed duration source even if `--mongo-uri` is configured
    #[arg(long)]
    pub no_mongo: bool,

    /// Defined node pool, e.g. `node1-node10,node15`
    #[arg(short = 'n', long)]
    pub nodes: Option<String>,

    /// Discover idle nodes from the Jenkins controller
    #[arg(short = 'a', long)]
    pub use_jenkins_nodes: bool,

    /// Jenkins controller base URL, required with `--use-jenkins-nodes`
    #[arg(long)]
    pub jenkins_url: Option<String>,

    /// Jenkins username
    #[arg(long)]
    pub jenkins_user: Option<String>,

    /// Jenkins password
    #[arg(long)]
    pub jenkins_pass: Option<String>,

    /// Nodes to exclude from the resolved pool
    #[arg(short = 'x', long, value_delimiter = ',')]
    pub exclude_nodes: Vec<String>,

    /// Nodes reserved for other use, excluded from the resolved pool
    #[arg(short = 'r', long, value_delimiter = ',')]
    pub reserved_nodes: Vec<String>,

    /// Feature name include patterns
    #[arg(short = 'f', long, value_delimiter = ',')]
    pub features: Vec<String>,

    /// Feature name exclude patterns
    #[arg(short = 'e', long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Which test groups to dispatch: all, crit, full, or tmp
    #[arg(short = 'g', long)]
    pub group_choice: Option<String>,

    /// Group name exclude patterns, applied after `--group-choice`
    #[arg(long, value_delimiter = ',')]
    pub group_filter: Vec<String>,

    /// Dispatch output path
    #[arg(short = 'o', long)]
    pub output: Option<Utf8PathBuf>,
}

impl Cli {
    fn to_config_args(&self) -> CliArgs {
        CliArgs {
            config_path: self.config.clone(),
            feature_list: self.feature_list.clone(),
            api_url: self.api_url.clone(),
            no_api: self.no_api,
            api_user: self.api_user.clone(),
            api_pass: self.api_pass.clone(),
            api_token: self.api_token.clone(),
            durations: self.durations.clone(),
            mongo_uri: self.mongo_uri.clone(),
            mongo_db: self.mongo_db.clone(),
            mongo_collection: self.mongo_collection.clone(),
            release: self.release.clone(),
            no_mongo: self.no_mongo,
            nodes: self.nodes.clone(),
            use_jenkins_nodes: self.use_jenkins_nodes,
            exclude_nodes: self.exclude_nodes.clone(),
            reserved_nodes: self.reserved_nodes.clone(),
            features: self.features.clone(),
            exclude: self.exclude.clone(),
            group_choice: self.group_choice.clone(),
            group_filter: self.group_filter.clone(),
            output: self.output.clone(),
        }
    }
}

/// Parses arguments, runs the pipeline, and returns the process exit code.
/// All user-facing error reporting happens here; the caller only needs to
/// map the result to `std::process::exit`.
pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = logging::init_tracing(cli.verbose) {
        eprintln!("failed to initialize logging: {e}");
    }

    match run_with(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(
                message = %err.user_message(),
                category = ?err.category(),
                "dispatch planning failed"
            );
            for suggestion in err.suggestions() {
                eprintln!("  hint: {suggestion}");
            }
            ExitCode::from(&err)
        }
    }
}

/// Jenkins credentials are only ever supplied via `--jenkins-user`/`--jenkins-pass`;
/// an absent value degrades to an unauthenticated request rather than failing.
fn jenkins_inventory<'a>(
    config: &Config,
    http: &'a HttpClient,
) -> Result<Option<JenkinsLiveInventory<'a>>, PlannerError> {
    if !config.nodes.use_jenkins_nodes {
        return Ok(None);
    }
    let url = config
        .nodes
        .jenkins_url
        .clone()
        .ok_or_else(|| PlannerError::InvalidArgument {
            key: "nodes.jenkins_url".to_string(),
            reason: "--use-jenkins-nodes requires --jenkins-url".to_string(),
        })?;
    Ok(Some(JenkinsLiveInventory::new(
        http,
        url,
        config.nodes.jenkins_user.clone().unwrap_or_default(),
        config.nodes.jenkins_pass.clone().unwrap_or_default(),
    )))
}

async fn run_with(cli: Cli) -> Result<(), PlannerError> {
    let config_args = cli.to_config_args();
    let config = Config::discover(&config_args)?;
    let planner_config = config.to_planner_config()?;

    let http = HttpClient::new()?;
    let catalog_loader = CatalogLoader::new(&http);

    let duration_primary: Box<dyn DurationSource> = match config.duration.query_url() {
        Some(url) if !config.duration.no_mongo => {
            Box::new(DocStoreSource::new(&http, url, String::new(), String::new()))
        }
        _ => Box::new(FileDurationSource::new(
            config
                .duration
                .durations
                .clone()
                .unwrap_or_else(|| Utf8PathBuf::from("durations.json")),
        )),
    };
    let duration_fallback: Option<Box<dyn DurationSource>> = config
        .duration
        .durations
        .clone()
        .map(|path| Box::new(FileDurationSource::new(path)) as Box<dyn DurationSource>);

    let live_inventory = jenkins_inventory(&config, &http)?;

    dispatch_engine::run(
        &planner_config,
        &catalog_loader,
        duration_primary.as_ref(),
        duration_fallback.as_deref(),
        live_inventory
            .as_ref()
            .map(|l| l as &dyn dispatch_nodes::LiveNodeInventory),
    )
    .await?;

    Ok(())
}
