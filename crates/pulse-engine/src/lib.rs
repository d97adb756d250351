//! Engagement analytics for Pulse.
//!
//! Read-side views over the `pulse-core` entity store: deterministic
//! ranking, per-user aggregation and tier classification, a merged activity
//! timeline, substring search, a materialized snapshot cache with atomic
//! refresh, and CSV report export.

pub mod aggregation;
pub mod engine;
pub mod error;
pub mod export;
pub mod ranking;
pub mod search;
pub mod snapshot;
pub mod timeline;

pub use aggregation::{EngagedUser, EngagementGroup, OverallStats, Tier, UserSummary};
pub use engine::{AnalyticsEngine, EngagementStats};
pub use error::AnalyticsError;
pub use ranking::RankedPost;
pub use search::SearchHit;
pub use snapshot::{Snapshot, SnapshotCache};
pub use timeline::{Activity, ActivityKind};
