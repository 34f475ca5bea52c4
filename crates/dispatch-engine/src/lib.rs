//! Filtering, duration aggregation, allocation, bin-packing, placement, and
//! dispatch-record emission (`§4.5`-`§4.9`).

pub mod allocator;
pub mod binpacker;
pub mod dispatch_record;
pub mod duration;
pub mod emitter;
pub mod filter;
pub mod placement;
pub mod planner;

pub use allocator::allocate;
pub use binpacker::{pack, Bin};
pub use dispatch_record::{build_record, DispatchRecord, SubmitOverrides};
pub use duration::{compute_durations, FeatureDuration, MISSING_GROUP_SECONDS};
pub use emitter::{order_records, write_dispatch_output};
pub use filter::{apply as apply_filter, FilterConfig, FilteredFeature, GroupChoice};
pub use placement::{resolve as resolve_placement, PlacementInput, StaticBindings};
pub use planner::{run, PlannerConfig};
