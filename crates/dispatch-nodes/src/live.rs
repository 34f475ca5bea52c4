//! Live node inventory (`§4.4`, `§6`): a CI controller's computer-status
//! endpoint.

use async_trait::async_trait;
use dispatch_http::HttpClient;
use dispatch_utils::error::PlannerError;
use serde::Deserialize;

/// Job name prefixes that mark a node as busy and therefore not idle.
/// Always includes both the snake_case and camelCase variants observed
/// across the source drafts (`§4.4`, `§9`).
const BLOCKED_JOB_PREFIXES: &[&str] = &[
    "fortistack_runtest",
    "fortistack_provision_fgts",
    "fortistackRunTests",
    "fortistackProvisionTestEnv",
];

#[derive(Debug, Deserialize)]
struct ComputerApiResponse {
    computer: Vec<Computer>,
}

#[derive(Debug, Deserialize)]
struct Computer {
    #[serde(rename = "displayName")]
    display_name: Option<String>,
    #[serde(default)]
    offline: bool,
    #[serde(default)]
    executors: Vec<Executor>,
}

#[derive(Debug, Deserialize)]
struct Executor {
    #[serde(rename = "currentExecutable")]
    current_executable: Option<CurrentExecutable>,
}

#[derive(Debug, Deserialize)]
struct CurrentExecutable {
    #[serde(rename = "fullDisplayName")]
    full_display_name: Option<String>,
}

fn is_busy(computer: &Computer) -> bool {
    computer.executors.iter().any(|executor| {
        executor
            .current_executable
            .as_ref()
            .and_then(|c| c.full_display_name.as_deref())
            .is_some_and(|job| BLOCKED_JOB_PREFIXES.iter().any(|p| job.starts_with(p)))
    })
}

/// A source of the live, currently-idle node set.
#[async_trait]
pub trait LiveNodeInventory: Send + Sync {
    async fn fetch_idle(&self) -> Result<Vec<String>, PlannerError>;
}

/// Queries `<controller>/computer/api/json?tree=...` with HTTP Basic auth.
pub struct JenkinsLiveInventory<'a> {
    http: &'a HttpClient,
    controller_url: String,
    user: String,
    pass: String,
}

impl<'a> JenkinsLiveInventory<'a> {
    #[must_use]
    pub fn new(http: &'a HttpClient, controller_url: String, user: String, pass: String) -> Self {
        Self {
            http,
            controller_url,
            user,
            pass,
        }
    }
}

#[async_trait]
impl<'a> LiveNodeInventory for JenkinsLiveInventory<'a> {
    async fn fetch_idle(&self) -> Result<Vec<String>, PlannerError> {
        let url = format!(
            "{}/computer/api/json?tree=computer[displayName,offline,executors[currentExecutable[fullDisplayName]]]",
            self.controller_url.trim_end_matches('/')
        );
        let response = self
            .http
            .get_basic(&url, &self.user, &self.pass, "live-inventory")
            .await?;
        let body: ComputerApiResponse = response.json().await?;

        let idle = body
            .computer
            .into_iter()
            .filter(|c| {
                let name_ok = c
                    .display_name
                    .as_deref()
                    .is_some_and(|n| !n.is_empty() && n != "master");
                name_ok && !c.offline && !is_busy(c)
            })
            .filter_map(|c| c.display_name)
            .collect();
        Ok(idle)
    }
}
