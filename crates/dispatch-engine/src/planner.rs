//! Top-level orchestration of the nine-step dispatch pipeline (`§2`).

use crate::dispatch_record::{DispatchRecord, SubmitOverrides};
use crate::duration::compute_durations;
use crate::emitter::{order_records, write_dispatch_output};
use crate::filter::{self, FilterConfig};
use crate::placement::{self, PlacementInput, StaticBindings};
use camino::Utf8PathBuf;
use dispatch_catalog::{CatalogLoader, CatalogSource, FeatureMerger};
use dispatch_duration::{DurationSource, DurationStore};
use dispatch_nodes::{LiveNodeInventory, Node, NodePoolResolver};
use dispatch_utils::error::PlannerError;
use tracing::info;

/// Everything `Planner::run` needs beyond the external source implementations
/// themselves: catalog location, node pool definition, filter settings, and
/// output destinations. Assembling credentials, config precedence, and CLI
/// parsing into this shape is the caller's responsibility.
pub struct PlannerConfig {
    pub catalog_source: CatalogSource,
    /// Catalog file to retry against if `catalog_source` is an HTTP endpoint
    /// that fails with `SourceUnavailable`/`Unauthorized` (`§4.1`, `§7`).
    pub catalog_fallback: Option<CatalogSource>,
    pub administrators: Vec<String>,
    pub defined_node_spec: Option<String>,
    pub use_live_nodes: bool,
    pub reserved_nodes: Vec<String>,
    pub excluded_nodes: Vec<String>,
    pub release: Option<String>,
    pub filter: FilterConfig,
    pub static_bindings: StaticBindings,
    pub submit_overrides: SubmitOverrides,
    pub output_path: Utf8PathBuf,
    pub mirror_paths: Vec<Utf8PathBuf>,
}

/// Runs the full catalog-to-dispatch pipeline and writes the result.
///
/// Node-pool resolution, the duration store load, and the catalog fetch are
/// independent I/O boundaries; allocation only begins once all three have
/// joined (`§5`).
pub async fn run(
    config: &PlannerConfig,
    http_loader: &CatalogLoader<'_>,
    duration_primary: &dyn DurationSource,
    duration_fallback: Option<&dyn DurationSource>,
    live_inventory: Option<&dyn LiveNodeInventory>,
) -> Result<Vec<DispatchRecord>, PlannerError> {
    let node_resolver = NodePoolResolver::new(live_inventory);
    let (raw_records, available_nodes, duration_store) = tokio::join!(
        load_catalog(http_loader, &config.catalog_source, config.catalog_fallback.as_ref()),
        node_resolver.resolve(
            config.defined_node_spec.as_deref(),
            config.use_live_nodes,
            &config.reserved_nodes,
            &config.excluded_nodes,
        ),
        load_duration_store(duration_primary, duration_fallback, config.release.as_deref()),
    );

    let raw_records = raw_records?;
    let available_nodes: Vec<Node> = available_nodes?;
    let duration_store = duration_store?;

    let merger = FeatureMerger::new(config.administrators.clone());
    let merged = merger.merge(raw_records);

    let filtered = filter::apply(merged, &config.filter)?;
    let durations = compute_durations(&filtered, &duration_store);

    let total_seconds: Vec<u64> = durations.iter().map(|d| d.total_seconds).collect();
    let group_counts: Vec<usize> = filtered.iter().map(|f| f.groups.len()).collect();
    let counts = crate::allocator::allocate(&total_seconds, &group_counts, available_nodes.len());

    let placement_inputs: Vec<PlacementInput<'_>> = filtered
        .iter()
        .zip(durations.iter())
        .zip(counts.iter())
        .map(|((f, duration), &node_count)| PlacementInput {
            record: &f.record,
            duration,
            node_count,
        })
        .collect();

    let records = placement::resolve(
        &placement_inputs,
        &available_nodes,
        &config.static_bindings,
        &config.administrators,
        &config.submit_overrides,
    )?;
    let records = order_records(records);

    info!(count = records.len(), "dispatch plan computed");

    let mirrors: Vec<&camino::Utf8Path> = config.mirror_paths.iter().map(Utf8PathBuf::as_path).collect();
    write_dispatch_output(&records, &config.output_path, &mirrors)?;

    Ok(records)
}

/// Loads the catalog from its primary source, retrying against `fallback`
/// when the primary attempt fails with `SourceUnavailable` or `Unauthorized`
/// (`§4.1`, `§7`). A fallback failure is surfaced as-is; there is nowhere
/// further to fall back to.
async fn load_catalog(
    loader: &CatalogLoader<'_>,
    primary: &CatalogSource,
    fallback: Option<&CatalogSource>,
) -> Result<Vec<dispatch_catalog::RawRecord>, PlannerError> {
    match loader.load(primary).await {
        Ok(records) => Ok(records),
        Err(e @ (PlannerError::SourceUnavailable { .. } | PlannerError::Unauthorized { .. })) => {
            match fallback {
                Some(fallback_source) => {
                    tracing::warn!(error = %e, "catalog source unavailable, falling back to file");
                    loader.load(fallback_source).await
                }
                None => Err(e),
            }
        }
        Err(e) => Err(e),
    }
}

async fn load_duration_store(
    primary: &dyn DurationSource,
    fallback: Option<&dyn DurationSource>,
    release: Option<&str>,
) -> Result<DurationStore, PlannerError> {
    Ok(DurationStore::load(primary, fallback, release).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_http::HttpClient;
    use std::io::Write;

    #[tokio::test]
    async fn falls_back_to_file_when_primary_source_unavailable() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"antivirus": {{"test_groups": ["g1"]}}}}"#).unwrap();
        let fallback_path = Utf8PathBuf::from_path_buf(file.path().to_path_buf()).unwrap();

        let http = HttpClient::new().unwrap();
        let loader = CatalogLoader::new(&http);
        let primary = CatalogSource::File(Utf8PathBuf::from("/nonexistent/catalog.json"));
        let fallback = CatalogSource::File(fallback_path);

        let records = load_catalog(&loader, &primary, Some(&fallback)).await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn surfaces_primary_error_when_no_fallback_configured() {
        let http = HttpClient::new().unwrap();
        let loader = CatalogLoader::new(&http);
        let primary = CatalogSource::File(Utf8PathBuf::from("/nonexistent/catalog.json"));

        let err = load_catalog(&loader, &primary, None).await.unwrap_err();
        assert!(matches!(err, PlannerError::SourceUnavailable { .. }));
    }
}
