//! `CatalogLoader` (`§4.1`): fetches raw catalog bytes from a file or HTTP
//! source and normalizes them into `RawRecord`s.

use crate::raw::{parse_shapes, RawRecord};
use camino::Utf8PathBuf;
use dispatch_http::{Credentials, HttpClient};
use dispatch_utils::error::PlannerError;
use tracing::warn;

/// Where the feature catalog comes from.
#[derive(Debug, Clone)]
pub enum CatalogSource {
    File(Utf8PathBuf),
    Http {
        url: String,
        credentials: Credentials,
    },
}

/// Loads and normalizes the feature catalog.
pub struct CatalogLoader<'a> {
    http: &'a HttpClient,
}

impl<'a> CatalogLoader<'a> {
    #[must_use]
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    pub async fn load(&self, source: &CatalogSource) -> Result<Vec<RawRecord>, PlannerError> {
        let body = match source {
            CatalogSource::File(path) => std::fs::read_to_string(path).map_err(|e| {
                PlannerError::SourceUnavailable {
                    source_name: format!("catalog file {path}"),
                    reason: e.to_string(),
                }
            })?,
            CatalogSource::Http { url, credentials } => {
                let response = self.http.fetch_catalog(url, credentials).await?;
                response.text().await?
            }
        };

        let value: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
            PlannerError::SourceUnavailable {
                source_name: "catalog".to_string(),
                reason: e.to_string(),
            }
        })?;

        let records = parse_shapes(value);
        if records.is_empty() {
            warn!("catalog source produced zero usable records");
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn loads_map_shape_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"antivirus": {{"test_groups": ["g1"]}}}}"#).unwrap();
        let path = Utf8PathBuf::from_path_buf(file.path().to_path_buf()).unwrap();

        let http = HttpClient::new().unwrap();
        let loader = CatalogLoader::new(&http);
        let records = loader.load(&CatalogSource::File(path)).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "antivirus");
    }

    #[tokio::test]
    async fn missing_file_is_source_unavailable() {
        let http = HttpClient::new().unwrap();
        let loader = CatalogLoader::new(&http);
        let err = loader
            .load(&CatalogSource::File(Utf8PathBuf::from(
                "/nonexistent/catalog.json",
            )))
            .await
            .unwrap_err();
        assert!(matches!(err, PlannerError::SourceUnavailable { .. }));
    }

    #[tokio::test]
    async fn malformed_json_is_source_unavailable_not_malformed_input() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let path = Utf8PathBuf::from_path_buf(file.path().to_path_buf()).unwrap();

        let http = HttpClient::new().unwrap();
        let loader = CatalogLoader::new(&http);
        let err = loader
            .load(&CatalogSource::File(path))
            .await
            .unwrap_err();
        assert!(matches!(err, PlannerError::SourceUnavailable { .. }));
    }
}
