//! `DispatchEmitter` (`§4.9`, `§6`): final ordering and atomic output write.

use crate::dispatch_record::DispatchRecord;
use camino::Utf8Path;
use dispatch_nodes::Node;
use dispatch_utils::atomic_write::write_file_atomic;
use dispatch_utils::error::PlannerError;

/// Sorts records by node numeric suffix ascending, matching the node
/// ordering contract in `§4.4`/`§4.9`.
#[must_use]
pub fn order_records(mut records: Vec<DispatchRecord>) -> Vec<DispatchRecord> {
    records.sort_by(|a, b| Node::new(&a.node_name).cmp(&Node::new(&b.node_name)));
    records
}

/// Serializes `records` to indented JSON and writes it atomically to
/// `primary`, mirroring the same bytes to each of `mirrors`.
pub fn write_dispatch_output(
    records: &[DispatchRecord],
    primary: &Utf8Path,
    mirrors: &[&Utf8Path],
) -> Result<(), PlannerError> {
    let body = serde_json::to_string_pretty(records)?;

    write_file_atomic(primary, &body).map_err(|e| PlannerError::SourceUnavailable {
        source_name: format!("dispatch output {primary}"),
        reason: e.to_string(),
    })?;

    for mirror in mirrors {
        write_file_atomic(mirror, &body).map_err(|e| PlannerError::SourceUnavailable {
            source_name: format!("dispatch mirror {mirror}"),
            reason: e.to_string(),
        })?;
    }

    Ok(())
}
