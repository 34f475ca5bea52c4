use camino::Utf8PathBuf;

/// The CLI surface as parsed by the `dispatch-cli` crate, decoupled from the
/// `clap` derive itself so this crate stays free of a CLI-parsing dependency.
/// Every field mirrors a flag in `§6`; `None`/empty means "not passed on the
/// command line".
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config_path: Option<Utf8PathBuf>,

    pub feature_list: Option<Utf8PathBuf>,
    pub api_url: Option<String>,
    pub no_api: bool,
    pub api_user: Option<String>,
    pub api_pass: Option<String>,
    pub api_token: Option<String>,

    pub durations: Option<Utf8PathBuf>,
    pub mongo_uri: Option<String>,
    pub mongo_db: Option<String>,
    pub mongo_collection: Option<String>,
    pub release: Option<String>,
    pub no_mongo: bool,

    pub nodes: Option<String>,
    pub use_jenkins_nodes: bool,
    pub exclude_nodes: Vec<String>,
    pub reserved_nodes: Vec<String>,

    pub features: Vec<String>,
    pub exclude: Vec<String>,
    pub group_choice: Option<String>,
    pub group_filter: Vec<String>,

    pub output: Option<Utf8PathBuf>,
}
