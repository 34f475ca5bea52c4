//! Duration sources (`§4.3`, `§6`): a document-store query and a JSON file
//! fallback, both normalized to `DurationObservation`.

use crate::format::parse_duration;
use crate::observation::DurationObservation;
use async_trait::async_trait;
use camino::Utf8PathBuf;
use dispatch_http::HttpClient;
use dispatch_utils::error::PlannerError;
use serde::Deserialize;
use serde_json::Value;

/// A source of historical duration observations.
#[async_trait]
pub trait DurationSource: Send + Sync {
    async fn fetch(&self, release: Option<&str>) -> Result<Vec<DurationObservation>, PlannerError>;
}

#[derive(Debug, Deserialize)]
struct DurationDocument {
    feature: String,
    feature_group: String,
    duration_human: String,
    build: i64,
    release: Option<String>,
    timestamp: Option<String>,
    created_at: Option<String>,
    date: Option<String>,
}

fn observation_from_document(doc: DurationDocument) -> DurationObservation {
    let seconds = parse_duration(&doc.duration_human);
    let timestamp = doc.timestamp.or(doc.created_at).or(doc.date);
    DurationObservation {
        feature: doc.feature,
        group: doc.feature_group,
        human_duration: doc.duration_human,
        seconds,
        release: doc.release,
        build: doc.build,
        timestamp,
    }
}

/// Queries an HTTP endpoint fronting the historical-runs document store.
/// Real deployments may back this with any document store; the contract is
/// the JSON document schema in `§6`, reached here over HTTP since no such
/// driver is part of this workspace's dependency stack.
pub struct DocStoreSource<'a> {
    http: &'a HttpClient,
    query_url: String,
    user: String,
    pass: String,
}

impl<'a> DocStoreSource<'a> {
    #[must_use]
    pub fn new(http: &'a HttpClient, query_url: String, user: String, pass: String) -> Self {
        Self {
            http,
            query_url,
            user,
            pass,
        }
    }
}

#[async_trait]
impl<'a> DurationSource for DocStoreSource<'a> {
    async fn fetch(&self, release: Option<&str>) -> Result<Vec<DurationObservation>, PlannerError> {
        let url = match release {
            Some(release) => format!("{}?release={}", self.query_url, release),
            None => self.query_url.clone(),
        };
        let response = self
            .http
            .get_basic(&url, &self.user, &self.pass, "duration-store")
            .await?;
        let docs: Vec<DurationDocument> = response.json().await?;
        let mut observations: Vec<DurationObservation> =
            docs.into_iter().map(observation_from_document).collect();
        observations.sort_by(|a, b| b.build.cmp(&a.build));
        Ok(observations)
    }
}

/// Loads the duration JSON fallback file (`§6`): either
/// `{feature: {group: "<duration>"}}`, or a list of `{feature, durations}}`
/// / single-key `{feature: {...}}` entries.
pub struct FileDurationSource {
    path: Utf8PathBuf,
}

impl FileDurationSource {
    #[must_use]
    pub fn new(path: Utf8PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl DurationSource for FileDurationSource {
    async fn fetch(&self, _release: Option<&str>) -> Result<Vec<DurationObservation>, PlannerError> {
        let body = std::fs::read_to_string(&self.path).map_err(|e| {
            PlannerError::SourceUnavailable {
                source_name: format!("duration file {}", self.path),
                reason: e.to_string(),
            }
        })?;
        let value: Value = serde_json::from_str(&body).map_err(|e| PlannerError::MalformedInput {
            location: "duration file".to_string(),
            reason: e.to_string(),
        })?;
        Ok(parse_duration_document(value))
    }
}

fn parse_duration_document(value: Value) -> Vec<DurationObservation> {
    let mut observations = Vec::new();
    match value {
        Value::Object(map) => {
            for (feature, durations) in map {
                collect_feature_durations(&feature, durations, &mut observations);
            }
        }
        Value::Array(items) => {
            for item in items {
                let Value::Object(mut obj) = item else {
                    continue;
                };
                if let Some(durations) = obj.remove("durations") {
                    let feature = obj
                        .get("feature")
                        .or_else(|| obj.get("FEATURE_NAME"))
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string();
                    collect_feature_durations(&feature, durations, &mut observations);
                } else if obj.len() == 1 {
                    let (feature, durations) = obj.into_iter().next().expect("len checked");
                    collect_feature_durations(&feature, durations, &mut observations);
                }
            }
        }
        _ => {}
    }
    observations
}

fn collect_feature_durations(feature: &str, durations: Value, out: &mut Vec<DurationObservation>) {
    let Value::Object(groups) = durations else {
        return;
    };
    for (group, human) in groups {
        let Some(human) = human.as_str() else { continue };
        out.push(DurationObservation {
            feature: feature.to_string(),
            group,
            human_duration: human.to_string(),
            seconds: parse_duration(human),
            release: None,
            build: 0,
            timestamp: None,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[tokio::test]
    async fn file_source_reads_map_shape() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"antivirus": {{"g1": "1 hr"}}}}"#
        )
        .unwrap();
        let path = Utf8PathBuf::from_path_buf(file.path().to_path_buf()).unwrap();
        let source = FileDurationSource::new(path);
        let observations = source.fetch(None).await.unwrap();
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].seconds, 3600);
    }

    #[test]
    fn parses_list_of_single_key_entries() {
        let doc = json!([{"antivirus": {"g1": "30 min"}}]);
        let observations = parse_duration_document(doc);
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].seconds, 1800);
    }

    #[test]
    fn parses_explicit_durations_field() {
        let doc = json!([{"feature": "antivirus", "durations": {"g1": "10 sec"}}]);
        let observations = parse_duration_document(doc);
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].seconds, 10);
    }
}
