//! Shared HTTP client for the catalog, duration, and node inventory sources.
//!
//! A single `reqwest::Client` is built once per process and reused across
//! all external calls, with bounded timeouts and retry/backoff for 5xx and
//! transport failures. 4xx responses are never retried.

use dispatch_utils::error::PlannerError;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_RETRIES: u32 = 2;
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Credentials available for the catalog HTTP endpoint's auth chain (`§6`).
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub token: Option<String>,
    pub user: Option<String>,
    pub pass: Option<String>,
}

impl Credentials {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.user.is_none() && self.pass.is_none()
    }
}

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn new() -> Result<Self, PlannerError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, PlannerError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .pool_idle_timeout(Duration::from_secs(90))
            .use_rustls_tls()
            .build()?;
        Ok(Self { client, timeout })
    }

    /// GET `url` with HTTP Basic auth (used by the live node inventory, `§6`).
    pub async fn get_basic(
        &self,
        url: &str,
        user: &str,
        pass: &str,
        source_name: &str,
    ) -> Result<Response, PlannerError> {
        let builder = self.client.get(url).basic_auth(user, Some(pass));
        self.execute_with_retry(builder, source_name).await
    }

    /// Fetch the feature catalog, trying each auth method in `§4.1`/`§6`
    /// order until one succeeds: bearer token, form-based token exchange,
    /// JSON login, then HTTP Basic. With no credentials configured, issues
    /// a plain unauthenticated GET.
    pub async fn fetch_catalog(
        &self,
        base_url: &str,
        credentials: &Credentials,
    ) -> Result<Response, PlannerError> {
        if credentials.is_empty() {
            return self
                .execute_with_retry(self.client.get(base_url), "catalog")
                .await;
        }

        if let Some(token) = &credentials.token {
            let builder = self.client.get(base_url).bearer_auth(token);
            match self.execute_with_retry(builder, "catalog").await {
                Ok(resp) => return Ok(resp),
                Err(PlannerError::Unauthorized { .. }) => {
                    debug!("bearer token rejected, trying form token exchange");
                }
                Err(other) => return Err(other),
            }
        }

        if let (Some(user), Some(pass)) = (&credentials.user, &credentials.pass) {
            if let Ok(token) = self.exchange_form_token(base_url, user, pass).await {
                let builder = self.client.get(base_url).bearer_auth(token);
                match self.execute_with_retry(builder, "catalog").await {
                    Ok(resp) => return Ok(resp),
                    Err(PlannerError::Unauthorized { .. }) => {
                        debug!("form-token session rejected, trying JSON login");
                    }
                    Err(other) => return Err(other),
                }
            }

            if let Ok(resp) = self.json_login(base_url, user, pass).await {
                return Ok(resp);
            }

            return self
                .get_basic(base_url, user, pass, "catalog")
                .await;
        }

        self.execute_with_retry(self.client.get(base_url), "catalog")
            .await
    }

    async fn exchange_form_token(
        &self,
        base_url: &str,
        user: &str,
        pass: &str,
    ) -> Result<String, PlannerError> {
        let token_url = format!("{}/token", base_url.trim_end_matches('/'));
        let resp = self
            .client
            .post(&token_url)
            .form(&[
                ("grant_type", "password"),
                ("username", user),
                ("password", pass),
            ])
            .timeout(self.timeout)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(PlannerError::SourceUnavailable {
                source_name: "catalog/token".to_string(),
                reason: format!("status {}", resp.status()),
            });
        }

        let body: serde_json::Value = resp.json().await?;
        body.get("access_token")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| PlannerError::MalformedInput {
                location: "catalog/token".to_string(),
                reason: "missing access_token field".to_string(),
            })
    }

    async fn json_login(
        &self,
        base_url: &str,
        user: &str,
        pass: &str,
    ) -> Result<Response, PlannerError> {
        let login_url = format!("{}/auth/login", base_url.trim_end_matches('/'));
        let resp = self
            .client
            .post(&login_url)
            .json(&serde_json::json!({"username": user, "password": pass}))
            .timeout(self.timeout)
            .send()
            .await?;

        if resp.status() == StatusCode::UNAUTHORIZED || resp.status() == StatusCode::FORBIDDEN {
            return Err(PlannerError::Unauthorized {
                source_name: "catalog".to_string(),
            });
        }
        if !resp.status().is_success() {
            return Err(PlannerError::SourceUnavailable {
                source_name: "catalog/auth/login".to_string(),
                reason: format!("status {}", resp.status()),
            });
        }

        self.execute_with_retry(self.client.get(base_url), "catalog")
            .await
    }

    /// Execute a request with bounded timeout and retry on 5xx/transport
    /// failures (exponential backoff). 4xx is never retried: 401/403 map to
    /// `Unauthorized`, other client errors to `SourceUnavailable`.
    async fn execute_with_retry(
        &self,
        request_builder: reqwest::RequestBuilder,
        source_name: &str,
    ) -> Result<Response, PlannerError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let request = request_builder
                .try_clone()
                .ok_or_else(|| PlannerError::SourceUnavailable {
                    source_name: source_name.to_string(),
                    reason: "request body not cloneable for retry".to_string(),
                })?
                .timeout(self.timeout)
                .build()?;

            debug!(source = source_name, attempt, "executing HTTP request");

            match self.client.execute(request).await {
                Ok(response) => {
                    let status = response.status();
                    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                        return Err(PlannerError::Unauthorized {
                            source_name: source_name.to_string(),
                        });
                    }
                    if status.is_client_error() {
                        return Err(PlannerError::SourceUnavailable {
                            source_name: source_name.to_string(),
                            reason: format!("client error {status}"),
                        });
                    }
                    if status.is_server_error() {
                        if attempt <= MAX_RETRIES {
                            warn!(source = source_name, attempt, %status, "server error, retrying");
                            tokio::time::sleep(INITIAL_BACKOFF * attempt).await;
                            continue;
                        }
                        return Err(PlannerError::SourceUnavailable {
                            source_name: source_name.to_string(),
                            reason: format!("server error {status} after {attempt} attempts"),
                        });
                    }
                    return Ok(response);
                }
                Err(e) => {
                    if e.is_timeout() {
                        return Err(PlannerError::SourceUnavailable {
                            source_name: source_name.to_string(),
                            reason: format!("timed out after {:?}", self.timeout),
                        });
                    }
                    if attempt <= MAX_RETRIES {
                        warn!(source = source_name, attempt, error = %e, "transport error, retrying");
                        tokio::time::sleep(INITIAL_BACKOFF * attempt).await;
                        continue;
                    }
                    return Err(PlannerError::SourceUnavailable {
                        source_name: source_name.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_credentials_detected() {
        let creds = Credentials::default();
        assert!(creds.is_empty());
    }

    #[test]
    fn client_constructs_with_default_timeout() {
        let client = HttpClient::new();
        assert!(client.is_ok());
    }

    #[test]
    fn client_constructs_with_custom_timeout() {
        let client = HttpClient::with_timeout(Duration::from_secs(5));
        assert!(client.is_ok());
    }
}
