//! `DurationStore` (`§4.3`): source precedence, dedup, and `(feature,
//! group) -> seconds` lookup.

use crate::observation::dedupe_by_latest_build;
use crate::source::DurationSource;
use std::collections::HashMap;
use tracing::warn;

/// Resolved `(feature, group) -> seconds` lookup, with no observation for a
/// key meaning the consumer should apply the 3600s default (`§4.3`).
pub struct DurationStore {
    by_key: HashMap<(String, String), u64>,
}

impl DurationStore {
    /// Queries `primary` (optionally filtered by `release`); on an empty
    /// result or an error, falls back to `fallback` if one is configured.
    /// A failing fallback is treated as an empty store rather than fatal,
    /// since missing observations degrade gracefully to the 3600s default.
    pub async fn load(
        primary: &dyn DurationSource,
        fallback: Option<&dyn DurationSource>,
        release: Option<&str>,
    ) -> Self {
        let observations = match primary.fetch(release).await {
            Ok(obs) if !obs.is_empty() => obs,
            Ok(_) => {
                warn!("duration document store returned no observations, falling back");
                Self::fetch_fallback(fallback).await
            }
            Err(e) => {
                warn!(error = %e, "duration document store unavailable, falling back");
                Self::fetch_fallback(fallback).await
            }
        };

        let deduped = dedupe_by_latest_build(observations);
        let by_key = deduped
            .into_iter()
            .map(|obs| ((obs.feature, obs.group), obs.seconds))
            .collect();
        Self { by_key }
    }

    async fn fetch_fallback(fallback: Option<&dyn DurationSource>) -> Vec<crate::observation::DurationObservation> {
        match fallback {
            Some(source) => source.fetch(None).await.unwrap_or_default(),
            None => Vec::new(),
        }
    }

    #[must_use]
    pub fn seconds_for(&self, feature: &str, group: &str) -> Option<u64> {
        self.by_key
            .get(&(feature.to_string(), group.to_string()))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::DurationObservation;
    use async_trait::async_trait;
    use dispatch_utils::error::PlannerError;

    struct StaticSource(Vec<DurationObservation>);

    #[async_trait]
    impl DurationSource for StaticSource {
        async fn fetch(&self, _release: Option<&str>) -> Result<Vec<DurationObservation>, PlannerError> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl DurationSource for FailingSource {
        async fn fetch(&self, _release: Option<&str>) -> Result<Vec<DurationObservation>, PlannerError> {
            Err(PlannerError::SourceUnavailable {
                source_name: "test".to_string(),
                reason: "boom".to_string(),
            })
        }
    }

    fn obs(feature: &str, group: &str, build: i64, seconds: u64) -> DurationObservation {
        DurationObservation {
            feature: feature.to_string(),
            group: group.to_string(),
            human_duration: String::new(),
            seconds,
            release: None,
            build,
            timestamp: None,
        }
    }

    #[tokio::test]
    async fn primary_source_used_when_nonempty() {
        let primary = StaticSource(vec![obs("antivirus", "g1", 1, 100)]);
        let store = DurationStore::load(&primary, None, None).await;
        assert_eq!(store.seconds_for("antivirus", "g1"), Some(100));
    }

    #[tokio::test]
    async fn falls_back_on_empty_primary() {
        let primary = StaticSource(vec![]);
        let fallback = StaticSource(vec![obs("antivirus", "g1", 1, 200)]);
        let store = DurationStore::load(&primary, Some(&fallback), None).await;
        assert_eq!(store.seconds_for("antivirus", "g1"), Some(200));
    }

    #[tokio::test]
    async fn falls_back_on_primary_error() {
        let primary = FailingSource;
        let fallback = StaticSource(vec![obs("antivirus", "g1", 1, 300)]);
        let store = DurationStore::load(&primary, Some(&fallback), None).await;
        assert_eq!(store.seconds_for("antivirus", "g1"), Some(300));
    }

    #[tokio::test]
    async fn missing_key_returns_none() {
        let primary = StaticSource(vec![]);
        let store = DurationStore::load(&primary, None, None).await;
        assert_eq!(store.seconds_for("antivirus", "g1"), None);
    }
}
