//! The analytics engine facade.
//!
//! Bundles the entity store, configuration, and snapshot cache behind one
//! handle so the web layer carries a single `Arc<AnalyticsEngine>`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use pulse_core::{EngineConfig, EntityStore};

use crate::aggregation::{self, EngagedUser, EngagementGroup, OverallStats, UserSummary};
use crate::error::AnalyticsError;
use crate::export;
use crate::ranking::{self, RankedPost};
use crate::search::{self, SearchHit};
use crate::snapshot::{Snapshot, SnapshotCache};
use crate::timeline::{self, Activity};

/// Combined payload of the engagement-stats view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngagementStats {
    pub overall_stats: OverallStats,
    pub top_engaged_users: Vec<EngagedUser>,
}

/// Read-side entry point for every analytical view.
///
/// The snapshot-backed views (`top_posts`, `user_summary`,
/// `engagement_stats`, `export_report`) serve the last refreshed snapshot
/// when one exists and fall back to a live computation before the first
/// refresh. Timeline, search, and grouped engagement are always live.
pub struct AnalyticsEngine {
    store: Arc<EntityStore>,
    config: EngineConfig,
    snapshots: SnapshotCache,
}

impl AnalyticsEngine {
    /// Create an engine over the given store.
    pub fn new(store: Arc<EntityStore>, config: EngineConfig) -> Self {
        Self {
            store,
            config,
            snapshots: SnapshotCache::new(),
        }
    }

    /// The underlying entity store, for the write path.
    pub fn store(&self) -> &Arc<EntityStore> {
        &self.store
    }

    /// The configuration this engine was built with.
    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Top posts by engagement score, snapshot-backed.
    pub async fn top_posts(&self, limit: usize) -> Vec<RankedPost> {
        if let Some(snap) = self.snapshots.current().await {
            return snap.top_posts.iter().take(limit).cloned().collect();
        }
        let view = self.store.view().await;
        ranking::top_posts(&view, limit)
    }

    /// Per-user engagement summary, snapshot-backed.
    pub async fn user_summary(&self) -> Vec<UserSummary> {
        if let Some(snap) = self.snapshots.current().await {
            return snap.user_summary.clone();
        }
        let view = self.store.view().await;
        aggregation::user_summary(&view)
    }

    /// Overall stats plus the most-liked-users leaderboard, snapshot-backed.
    pub async fn engagement_stats(&self) -> EngagementStats {
        if let Some(snap) = self.snapshots.current().await {
            return EngagementStats {
                overall_stats: snap.overall.clone(),
                top_engaged_users: snap.top_engaged_users.clone(),
            };
        }
        let view = self.store.view().await;
        EngagementStats {
            overall_stats: aggregation::overall_stats(&view),
            top_engaged_users: aggregation::top_engaged_users(&view),
        }
    }

    /// Grouped engagement tiers with a HAVING-style minimum-posts filter.
    /// Always live.
    pub async fn grouped_engagement(&self, min_posts: u64) -> Vec<EngagementGroup> {
        let view = self.store.view().await;
        aggregation::grouped_engagement(&view, min_posts, self.config.tiers)
    }

    /// Merged activity timeline, newest first. Always live.
    pub async fn union_activities(&self, limit: usize) -> Vec<Activity> {
        let view = self.store.view().await;
        timeline::union_activities(&view, limit)
    }

    /// Case-insensitive substring search over post content. Always live.
    pub async fn search_posts(&self, query: &str) -> Result<Vec<SearchHit>, AnalyticsError> {
        let view = self.store.view().await;
        search::search_posts(&view, query)
    }

    /// Recompute and atomically swap the materialized snapshot.
    pub async fn refresh(&self) -> Arc<Snapshot> {
        self.snapshots.refresh(&self.store).await
    }

    /// The current snapshot, if any refresh has completed.
    pub async fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshots.current().await
    }

    /// Export the top-posts table as CSV, snapshot-backed.
    pub async fn export_report(&self) -> Result<String, AnalyticsError> {
        if let Some(snap) = self.snapshots.current().await {
            return export::export_report(&snap.top_posts);
        }
        let view = self.store.view().await;
        let rows = ranking::top_posts(&view, usize::MAX);
        export::export_report(&rows)
    }
}
