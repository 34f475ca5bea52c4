//! `DispatchRecord` and `DispatchEmitter` (`§4.9`): the final, serializable
//! unit of work handed to each node.

use crate::binpacker::Bin;
use dispatch_catalog::{FeatureRecord, OrioleSubmitFlag};
use dispatch_duration::format::format_duration;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Per-feature override of `ORIOLE_SUBMIT_FLAG`, consulted ahead of the
/// feature's own field (`§4.9`).
pub type SubmitOverrides = HashMap<String, OrioleSubmitFlag>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchRecord {
    #[serde(rename = "NODE_NAME")]
    pub node_name: String,
    #[serde(rename = "FEATURE_NAME")]
    pub feature_name: String,
    #[serde(rename = "TEST_CASE_FOLDER")]
    pub test_case_folder: Option<String>,
    #[serde(rename = "TEST_CONFIG_CHOICE")]
    pub test_config_choice: Option<String>,
    #[serde(rename = "TEST_GROUP_CHOICE")]
    pub test_group_choice: String,
    #[serde(rename = "TEST_GROUPS")]
    pub test_groups: Vec<String>,
    #[serde(rename = "SUM_DURATION")]
    pub sum_duration: String,
    #[serde(rename = "DOCKER_COMPOSE_FILE_CHOICE")]
    pub docker_compose_file_choice: Option<String>,
    #[serde(rename = "SEND_TO")]
    pub send_to: String,
    #[serde(rename = "PROVISION_VMPC")]
    pub provision_vmpc: bool,
    #[serde(rename = "VMPC_NAMES")]
    pub vmpc_names: String,
    #[serde(rename = "PROVISION_DOCKER")]
    pub provision_docker: bool,
    #[serde(rename = "ORIOLE_SUBMIT_FLAG")]
    pub oriole_submit_flag: OrioleSubmitFlag,
}

/// Builds the record for one (feature, node, bin) placement.
#[must_use]
pub fn build_record(
    record: &FeatureRecord,
    node: &str,
    bin: &Bin,
    administrators: &[String],
    submit_overrides: &SubmitOverrides,
) -> DispatchRecord {
    let mut send_to: BTreeSet<String> = record
        .email
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    send_to.extend(administrators.iter().cloned());

    let oriole_submit_flag = submit_overrides
        .get(&record.name)
        .copied()
        .unwrap_or(record.oriole_submit_flag);

    DispatchRecord {
        node_name: node.to_string(),
        feature_name: record.name.clone(),
        test_case_folder: record.first_test_case_folder().map(str::to_string),
        test_config_choice: record.first_test_config().map(str::to_string),
        test_group_choice: bin.groups.first().cloned().unwrap_or_default(),
        test_groups: bin.groups.clone(),
        sum_duration: format_duration(bin.total_seconds),
        docker_compose_file_choice: record.first_docker_compose().map(str::to_string),
        send_to: send_to.into_iter().collect::<Vec<_>>().join(","),
        provision_vmpc: record.provision_vmpc,
        vmpc_names: record.vmpc_names.clone(),
        provision_docker: record.provision_docker,
        oriole_submit_flag,
    }
}
