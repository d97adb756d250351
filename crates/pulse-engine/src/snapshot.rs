//! Materialized snapshot of the expensive aggregate views.
//!
//! The original system refreshed a Postgres materialized view plus a stored
//! procedure on demand. Here that is an explicit cache object: `refresh()`
//! recomputes every part from one consistent store view and swaps the whole
//! snapshot in a single assignment, so readers see all-old or all-new data,
//! never a mix. A refresh future dropped before the swap leaves the old
//! snapshot untouched.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use pulse_core::{EntityStore, StoreView};

use crate::aggregation::{
    self, EngagedUser, OverallStats, UserSummary,
};
use crate::ranking::{self, RankedPost};

/// Last-computed aggregate results, served until the next refresh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub refreshed_at: DateTime<Utc>,
    pub overall: OverallStats,
    /// Full ranking; readers truncate to their own limit.
    pub top_posts: Vec<RankedPost>,
    pub user_summary: Vec<UserSummary>,
    pub top_engaged_users: Vec<EngagedUser>,
}

impl Snapshot {
    /// Compute every part from a single consistent store view.
    pub fn compute(view: &StoreView<'_>) -> Self {
        Self {
            refreshed_at: Utc::now(),
            overall: aggregation::overall_stats(view),
            top_posts: ranking::top_posts(view, usize::MAX),
            user_summary: aggregation::user_summary(view),
            top_engaged_users: aggregation::top_engaged_users(view),
        }
    }
}

/// Holder for the current snapshot with single-flight refresh.
pub struct SnapshotCache {
    current: RwLock<Option<Arc<Snapshot>>>,
    /// Serializes refreshes. A second caller blocked here is coalesced into
    /// the first caller's result instead of recomputing.
    refresh_gate: Mutex<()>,
}

impl SnapshotCache {
    /// Create an empty cache; `current()` returns `None` until the first
    /// refresh.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
            refresh_gate: Mutex::new(()),
        }
    }

    /// The latest snapshot, if one has been computed.
    pub async fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.read().await.clone()
    }

    /// Recompute all aggregates and atomically replace the snapshot.
    ///
    /// Returns the snapshot now being served. If another refresh completes
    /// while this call waits for the gate, its result is returned as-is.
    pub async fn refresh(&self, store: &EntityStore) -> Arc<Snapshot> {
        let requested_at = Utc::now();
        let _gate = self.refresh_gate.lock().await;

        if let Some(existing) = self.current.read().await.clone()
            && existing.refreshed_at >= requested_at
        {
            debug!("coalesced into a refresh that just completed");
            return existing;
        }

        let snapshot = {
            let view = store.view().await;
            Arc::new(Snapshot::compute(&view))
        };

        *self.current.write().await = Some(Arc::clone(&snapshot));
        info!(
            posts = snapshot.overall.total_posts,
            likes = snapshot.overall.total_likes,
            comments = snapshot.overall.total_comments,
            "refreshed analytics snapshot"
        );
        snapshot
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}
