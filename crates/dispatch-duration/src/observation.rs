//! `DurationObservation` (`§3`): one historical per-group runtime sample.

/// A single historical runtime sample for `(feature, group)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationObservation {
    pub feature: String,
    pub group: String,
    pub human_duration: String,
    pub seconds: u64,
    pub release: Option<String>,
    pub build: i64,
    pub timestamp: Option<String>,
}

/// Retain, for each `(feature, group)` key, only the observation with the
/// largest `build` number (`§4.3` dedup rule).
#[must_use]
pub fn dedupe_by_latest_build(observations: Vec<DurationObservation>) -> Vec<DurationObservation> {
    use std::collections::HashMap;

    let mut latest: HashMap<(String, String), DurationObservation> = HashMap::new();
    for obs in observations {
        let key = (obs.feature.clone(), obs.group.clone());
        match latest.get(&key) {
            Some(existing) if existing.build >= obs.build => {}
            _ => {
                latest.insert(key, obs);
            }
        }
    }
    latest.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn keeps_highest_build_per_key() {
        let observations = vec![
            obs("antivirus", "g1", 10, 100),
            obs("antivirus", "g1", 42, 200),
            obs("antivirus", "g1", 30, 150),
        ];
        let deduped = dedupe_by_latest_build(observations);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].build, 42);
        assert_eq!(deduped[0].seconds, 200);
    }

    #[test]
    fn distinct_keys_are_independent() {
        let observations = vec![obs("antivirus", "g1", 1, 100), obs("antivirus", "g2", 1, 200)];
        let deduped = dedupe_by_latest_build(observations);
        assert_eq!(deduped.len(), 2);
    }
}
