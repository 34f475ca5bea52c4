//! Historical test-group duration aggregation (`§4.3`).

pub mod format;
pub mod observation;
pub mod source;
pub mod store;

pub use format::{format_duration, parse_duration};
pub use observation::DurationObservation;
pub use source::{DocStoreSource, DurationSource, FileDurationSource};
pub use store::DurationStore;
