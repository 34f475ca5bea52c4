//! Shape normalization for raw catalog records (`§4.1`, `§9`).
//!
//! `CatalogLoader` accepts three JSON shapes and normalizes each into a
//! `RawRecord`: a resolved name plus the record's remaining fields. The
//! shape itself is never exposed past this module.

use serde_json::{Map, Value};
use tracing::warn;

/// A name-resolved record, still holding JSON-typed fields prior to
/// `FeatureMerger` folding them into a canonical `FeatureRecord`.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub name: String,
    pub fields: Map<String, Value>,
}

const NAME_KEYS: &[&str] = &["FEATURE_NAME", "feature_name", "feature", "name"];

fn resolve_name(fields: &Map<String, Value>) -> Option<String> {
    for key in NAME_KEYS {
        if let Some(Value::String(s)) = fields.get(*key) {
            if !s.trim().is_empty() {
                return Some(s.clone());
            }
        }
    }
    None
}

/// Normalize a parsed JSON document into an ordered sequence of `RawRecord`s,
/// accepting any of the three shapes documented in `§4.1`.
pub fn parse_shapes(value: Value) -> Vec<RawRecord> {
    match value {
        Value::Object(map) => map
            .into_iter()
            .filter_map(|(name, config)| match config {
                Value::Object(fields) => Some(RawRecord { name, fields }),
                other => {
                    warn!(name, ?other, "skipping non-object catalog entry");
                    None
                }
            })
            .collect(),
        Value::Array(items) => items
            .into_iter()
            .filter_map(parse_array_item)
            .collect(),
        other => {
            warn!(?other, "catalog document is neither an object nor an array");
            Vec::new()
        }
    }
}

fn parse_array_item(item: Value) -> Option<RawRecord> {
    let Value::Object(mut fields) = item else {
        warn!("skipping non-object catalog list entry");
        return None;
    };

    if let Some(name) = resolve_name(&fields) {
        for key in NAME_KEYS {
            fields.remove(*key);
        }
        return Some(RawRecord { name, fields });
    }

    if fields.len() == 1 {
        let (name, config) = fields.into_iter().next().expect("len checked above");
        return match config {
            Value::Object(fields) => Some(RawRecord { name, fields }),
            other => {
                warn!(name, ?other, "skipping non-object single-key catalog entry");
                None
            }
        };
    }

    warn!("dropping catalog entry with no resolvable FEATURE_NAME");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn map_shape_is_name_to_config() {
        let doc = json!({"antivirus": {"test_groups": ["g1"]}});
        let records = parse_shapes(doc);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "antivirus");
    }

    #[test]
    fn list_of_single_key_maps() {
        let doc = json!([{"antivirus": {"test_groups": ["g1"]}}]);
        let records = parse_shapes(doc);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "antivirus");
    }

    #[test]
    fn list_with_feature_name_field() {
        let doc = json!([{"FEATURE_NAME": "antivirus", "test_groups": ["g1"]}]);
        let records = parse_shapes(doc);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "antivirus");
        assert!(!records[0].fields.contains_key("FEATURE_NAME"));
    }

    #[test]
    fn synonym_name_keys_are_promoted() {
        let doc = json!([{"feature": "webfilter", "test_groups": []}]);
        let records = parse_shapes(doc);
        assert_eq!(records[0].name, "webfilter");
    }

    #[test]
    fn nameless_multi_key_entry_is_dropped() {
        let doc = json!([{"a": 1, "b": 2}]);
        let records = parse_shapes(doc);
        assert!(records.is_empty());
    }

    #[test]
    fn empty_name_is_dropped() {
        let doc = json!([{"FEATURE_NAME": "   "}]);
        let records = parse_shapes(doc);
        assert!(records.is_empty());
    }
}
