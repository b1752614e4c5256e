//! Storage and arithmetic for the growth agent: versioned snapshot series,
//! the CSV mirror, delta computation, message rendering and milestone
//! bookkeeping. Nothing in this crate touches the network.

pub mod csv;
pub mod delta;
pub mod family;
pub mod format;
pub mod milestone;
pub mod models;
pub mod store;

pub use delta::{DeltaResult, PercentChange, ReleaseDelta, compare_release, compute_delta};
pub use family::MetricFamily;
pub use milestone::{MilestoneState, MilestoneTracker};
pub use models::{MetricRecord, MetricSeries};
pub use store::{SnapshotStore, StoreError};
