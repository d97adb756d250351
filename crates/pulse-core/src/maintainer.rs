//! Incremental maintenance of derived engagement counters.
//!
//! The original system kept counters fresh with database triggers. Here the
//! same behavior is an explicit on-write hook: the store invokes the
//! maintainer inside the write-lock critical section of every Like/Comment
//! mutation, so the raw row and its counter increment land as one atomic
//! unit. No other component writes `like_count`, `comment_count`,
//! `engagement_score`, or the per-user received totals.

use crate::config::ScoreWeights;
use crate::types::{Post, User};

/// On-write hook that keeps Post and User derived counters synchronized
/// with raw activity.
#[derive(Debug, Clone, Copy)]
pub struct EngagementMaintainer {
    weights: ScoreWeights,
}

impl EngagementMaintainer {
    /// Create a maintainer with the given score weights.
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    /// The weights this maintainer scores with.
    pub fn weights(&self) -> ScoreWeights {
        self.weights
    }

    /// Compute the engagement score for the given counters.
    pub fn score(&self, like_count: u64, comment_count: u64) -> f64 {
        self.weights.like_weight * like_count as f64
            + self.weights.comment_weight * comment_count as f64
    }

    /// Record a new like: bump the post's like count, recompute its score,
    /// and attribute the like to the post's owner.
    pub fn apply_like(&self, post: &mut Post, owner: &mut User) {
        post.like_count += 1;
        post.engagement_score = self.score(post.like_count, post.comment_count);
        owner.total_likes_received += 1;
    }

    /// Undo a like: the exact inverse of [`apply_like`].
    ///
    /// Callers must only invoke this for a like that was previously applied,
    /// so the counters are guaranteed nonzero.
    ///
    /// [`apply_like`]: EngagementMaintainer::apply_like
    pub fn revert_like(&self, post: &mut Post, owner: &mut User) {
        post.like_count = post.like_count.saturating_sub(1);
        post.engagement_score = self.score(post.like_count, post.comment_count);
        owner.total_likes_received = owner.total_likes_received.saturating_sub(1);
    }

    /// Record a new comment: bump the post's comment count, recompute its
    /// score, and attribute the comment to the post's owner.
    pub fn apply_comment(&self, post: &mut Post, owner: &mut User) {
        post.comment_count += 1;
        post.engagement_score = self.score(post.like_count, post.comment_count);
        owner.total_comments_received += 1;
    }
}
