//! `PlacementResolver` (`§4.8`): binds static-binding features to their
//! declared nodes first, then streams remaining features to remaining
//! nodes in order.

use crate::binpacker::pack;
use crate::dispatch_record::{build_record, DispatchRecord, SubmitOverrides};
use crate::duration::FeatureDuration;
use dispatch_catalog::FeatureRecord;
use dispatch_nodes::Node;
use dispatch_utils::error::PlannerError;
use std::collections::{HashMap, HashSet};

/// feature name -> ordered list of bound node names (`§3` StaticBinding).
pub type StaticBindings = HashMap<String, Vec<String>>;

/// A feature paired with its computed durations and allocator-assigned node
/// count. `node_count` is ignored for statically-bound features.
pub struct PlacementInput<'a> {
    pub record: &'a FeatureRecord,
    pub duration: &'a FeatureDuration,
    pub node_count: usize,
}

/// Runs the `§4.8` placement algorithm. Returns records in the order
/// produced (static features first, then dynamic); final node-order sorting
/// is the caller's responsibility per `§4.9`.
pub fn resolve(
    inputs: &[PlacementInput<'_>],
    available: &[Node],
    static_bindings: &StaticBindings,
    administrators: &[String],
    submit_overrides: &SubmitOverrides,
) -> Result<Vec<DispatchRecord>, PlannerError> {
    let available_names: HashSet<&str> = available.iter().map(|n| n.name.as_str()).collect();

    let mut static_inputs = Vec::new();
    let mut dynamic_inputs = Vec::new();
    for input in inputs {
        if static_bindings.contains_key(&input.record.name) {
            static_inputs.push(input);
        } else {
            dynamic_inputs.push(input);
        }
    }

    let mut records = Vec::new();
    let mut claimed: HashMap<String, String> = HashMap::new();

    for input in &static_inputs {
        let bound = &static_bindings[&input.record.name];
        let intersection: Vec<&str> = bound
            .iter()
            .filter(|n| available_names.contains(n.as_str()))
            .map(String::as_str)
            .collect();
        for node in &intersection {
            if let Some(first) = claimed.get(*node) {
                return Err(PlannerError::StaticConflict {
                    node: (*node).to_string(),
                    first_feature: first.clone(),
                    second_feature: input.record.name.clone(),
                });
            }
        }
        for node in &intersection {
            claimed.insert((*node).to_string(), input.record.name.clone());
        }
        if intersection.is_empty() {
            continue;
        }
        let bins = pack(&input.duration.per_group_seconds, intersection.len());
        for (node, bin) in intersection.iter().zip(bins.iter()) {
            if bin.groups.is_empty() {
                continue;
            }
            records.push(build_record(
                input.record,
                node,
                bin,
                administrators,
                submit_overrides,
            ));
        }
    }

    let dynamic_pool: Vec<&Node> = available
        .iter()
        .filter(|n| !claimed.contains_key(&n.name))
        .collect();
    let mut cursor = 0usize;

    for input in &dynamic_inputs {
        let bins = pack(&input.duration.per_group_seconds, input.node_count);
        let non_empty: Vec<_> = bins.iter().filter(|b| !b.groups.is_empty()).collect();
        let remaining = dynamic_pool.len().saturating_sub(cursor);
        if remaining < non_empty.len() {
            tracing::warn!(
                feature = %input.record.name,
                skipped_bins = non_empty.len() - remaining,
                "ran out of dynamic nodes while placing feature"
            );
        }
        for bin in non_empty {
            if cursor >= dynamic_pool.len() {
                break;
            }
            let node = dynamic_pool[cursor];
            cursor += 1;
            records.push(build_record(
                input.record,
                &node.name,
                bin,
                administrators,
                submit_overrides,
            ));
        }
    }

    Ok(records)
}
