//! Feature catalog loading and merging (`§4.1`, `§4.2`).

pub mod loader;
pub mod merger;
pub mod raw;
pub mod record;

pub use loader::{CatalogLoader, CatalogSource};
pub use merger::FeatureMerger;
pub use raw::RawRecord;
pub use record::{FeatureRecord, OrioleSubmitFlag};
