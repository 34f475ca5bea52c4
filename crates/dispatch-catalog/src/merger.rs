//! `FeatureMerger` (`§4.2`): folds raw records sharing a name into one
//! canonical `FeatureRecord`.

use crate::raw::RawRecord;
use crate::record::{dedup_push, FeatureRecord, OrioleSubmitFlag};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::str::FromStr;

fn get_field<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    fields
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v)
}

fn string_list_field(fields: &Map<String, Value>, key: &str) -> Vec<String> {
    match get_field(fields, key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn bool_field(fields: &Map<String, Value>, key: &str) -> Option<bool> {
    get_field(fields, key).and_then(Value::as_bool)
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    get_field(fields, key).and_then(|v| v.as_str()).map(str::to_string)
}

struct Accumulator {
    test_case_folder: Vec<String>,
    test_config: Vec<String>,
    test_groups: Vec<String>,
    docker_compose: Vec<String>,
    emails: BTreeSet<String>,
    provision_vmpc: bool,
    vmpc_names: String,
    provision_docker: bool,
    oriole_submit_flag: OrioleSubmitFlag,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self {
            test_case_folder: Vec::new(),
            test_config: Vec::new(),
            test_groups: Vec::new(),
            docker_compose: Vec::new(),
            emails: BTreeSet::new(),
            provision_vmpc: false,
            vmpc_names: String::new(),
            provision_docker: true,
            oriole_submit_flag: OrioleSubmitFlag::default(),
        }
    }
}

/// Merges raw records into canonical `FeatureRecord`s, injecting the
/// configured administrator email set into every feature.
pub struct FeatureMerger {
    administrators: Vec<String>,
}

impl FeatureMerger {
    #[must_use]
    pub fn new(administrators: Vec<String>) -> Self {
        Self { administrators }
    }

    #[must_use]
    pub fn merge(&self, raw_records: Vec<RawRecord>) -> Vec<FeatureRecord> {
        let mut order: Vec<String> = Vec::new();
        let mut accumulators: std::collections::HashMap<String, Accumulator> =
            std::collections::HashMap::new();

        for record in raw_records {
            if !accumulators.contains_key(&record.name) {
                order.push(record.name.clone());
            }
            let acc = accumulators.entry(record.name.clone()).or_default();
            self.fold_into(acc, &record.fields);
        }

        order
            .into_iter()
            .map(|name| {
                let acc = accumulators.remove(&name).expect("accumulated above");
                self.finalize(name, acc)
            })
            .collect()
    }

    fn fold_into(&self, acc: &mut Accumulator, fields: &Map<String, Value>) {
        for v in string_list_field(fields, "test_case_folder") {
            dedup_push(&mut acc.test_case_folder, v);
        }
        for v in string_list_field(fields, "test_config") {
            dedup_push(&mut acc.test_config, v);
        }
        for v in string_list_field(fields, "test_groups") {
            dedup_push(&mut acc.test_groups, v);
        }
        for v in string_list_field(fields, "docker_compose") {
            dedup_push(&mut acc.docker_compose, v);
        }
        if let Some(raw) = string_field(fields, "email") {
            for addr in raw.split(',') {
                let addr = addr.trim();
                if !addr.is_empty() {
                    acc.emails.insert(addr.to_string());
                }
            }
        }
        if let Some(v) = bool_field(fields, "PROVISION_VMPC") {
            acc.provision_vmpc = v;
        }
        if let Some(v) = string_field(fields, "VMPC_NAMES") {
            acc.vmpc_names = v;
        }
        if let Some(v) = bool_field(fields, "PROVISION_DOCKER") {
            acc.provision_docker = v;
        }
        if let Some(v) = string_field(fields, "ORIOLE_SUBMIT_FLAG")
            .and_then(|s| OrioleSubmitFlag::from_str(&s).ok())
        {
            acc.oriole_submit_flag = v;
        }
    }

    fn finalize(&self, name: String, acc: Accumulator) -> FeatureRecord {
        let mut merged: BTreeSet<String> = acc.emails;
        merged.extend(self.administrators.iter().cloned());
        let email = merged.into_iter().collect::<Vec<_>>().join(",");

        FeatureRecord {
            name,
            test_case_folder: acc.test_case_folder,
            test_config: acc.test_config,
            test_groups: acc.test_groups,
            docker_compose: acc.docker_compose,
            email,
            provision_vmpc: acc.provision_vmpc,
            vmpc_names: acc.vmpc_names,
            provision_docker: acc.provision_docker,
            oriole_submit_flag: acc.oriole_submit_flag,
        }
    }
}
