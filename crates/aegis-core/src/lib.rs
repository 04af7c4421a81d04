//! Core read model: domain records, invariants, allocation metrics, and the data-source boundary.

mod error;
pub mod metrics;
pub mod mock;
pub mod model;
pub mod source;
pub mod urgency;

pub use error::{MetricsError, ModelError};
pub use metrics::{
    AllocationMetrics, AllocationSummary, Tier, allocation_percentage, is_shortage,
    progress_tier, shortage_quantity,
};
pub use mock::MockSource;
pub use model::{
    DisasterKind, DisasterZone, EmergencyMessage, EvacuationRoute, GeoPoint, ModelState,
    ResourceAllocation, ResourceKind, RouteStatus, Score, SystemStatus,
};
pub use source::{DataSource, Snapshot};
pub use urgency::{Priority, PriorityBand, Severity, Urgent, sort_by_urgency};
