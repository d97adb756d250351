//! Per-user aggregation: summaries, grouped engagement tiers, overall stats.

use serde::{Deserialize, Serialize};

use pulse_core::{StoreView, TierThresholds, UserId};

/// How many users the engagement-stats leaderboard shows.
const TOP_ENGAGED_LIMIT: usize = 5;

/// Per-user engagement summary row.
///
/// Every user appears, including users with zero posts (left-join
/// semantics, not inner-join).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSummary {
    pub user_id: UserId,
    pub username: String,
    pub total_posts: u64,
    pub total_likes_received: u64,
    pub total_comments_received: u64,
}

/// Engagement tier classification for a user's average engagement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Tier {
    High,
    Medium,
    Low,
}

impl Tier {
    /// Classify an average engagement against threshold boundaries.
    ///
    /// Boundaries are inclusive: an average exactly equal to the High
    /// threshold classifies as High.
    pub fn classify(avg_engagement: f64, thresholds: TierThresholds) -> Self {
        if avg_engagement >= thresholds.high {
            Tier::High
        } else if avg_engagement >= thresholds.medium {
            Tier::Medium
        } else {
            Tier::Low
        }
    }
}

/// One group row of the grouped-engagement view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngagementGroup {
    pub user_id: UserId,
    pub username: String,
    pub post_count: u64,
    pub avg_engagement: f64,
    pub total_likes: u64,
    pub tier: Tier,
}

/// Overall stats across all posts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverallStats {
    pub total_posts: u64,
    pub total_likes: u64,
    pub total_comments: u64,
    pub avg_engagement: f64,
    pub max_engagement: f64,
}

/// A leaderboard entry for the most-liked users.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngagedUser {
    pub username: String,
    pub total_likes_received: u64,
    /// Dense rank: users with equal like totals share a rank.
    pub rank: u32,
}

/// Group all activity by user and report post/like/comment totals.
///
/// Ordered by likes received descending, then username, so the output is
/// stable across calls.
pub fn user_summary(view: &StoreView<'_>) -> Vec<UserSummary> {
    let mut rows: Vec<UserSummary> = view
        .users()
        .map(|user| UserSummary {
            user_id: user.id,
            username: user.username.clone(),
            total_posts: view.posts().filter(|p| p.user_id == user.id).count() as u64,
            total_likes_received: user.total_likes_received,
            total_comments_received: user.total_comments_received,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.total_likes_received
            .cmp(&a.total_likes_received)
            .then_with(|| a.username.cmp(&b.username))
    });
    rows
}

/// Group posts by owner, filter small groups, classify the rest.
///
/// The `min_posts` filter applies *after* aggregation (HAVING semantics):
/// a user's posts all count toward the group even if the group is then
/// dropped. Users with zero posts form no group and never appear.
pub fn grouped_engagement(
    view: &StoreView<'_>,
    min_posts: u64,
    thresholds: TierThresholds,
) -> Vec<EngagementGroup> {
    let mut groups: Vec<EngagementGroup> = view
        .users()
        .filter_map(|user| {
            let mut post_count = 0u64;
            let mut score_sum = 0.0;
            let mut total_likes = 0u64;
            for post in view.posts().filter(|p| p.user_id == user.id) {
                post_count += 1;
                score_sum += post.engagement_score;
                total_likes += post.like_count;
            }
            if post_count == 0 || post_count < min_posts {
                return None;
            }
            let avg_engagement = score_sum / post_count as f64;
            Some(EngagementGroup {
                user_id: user.id,
                username: user.username.clone(),
                post_count,
                avg_engagement,
                total_likes,
                tier: Tier::classify(avg_engagement, thresholds),
            })
        })
        .collect();

    groups.sort_by(|a, b| {
        b.avg_engagement
            .total_cmp(&a.avg_engagement)
            .then_with(|| a.username.cmp(&b.username))
    });
    groups
}

/// Totals and averages across every post.
pub fn overall_stats(view: &StoreView<'_>) -> OverallStats {
    let total_posts = view.post_count() as u64;
    let total_likes = view.like_count() as u64;
    let total_comments = view.comment_count() as u64;

    let (avg_engagement, max_engagement) = if total_posts == 0 {
        (0.0, 0.0)
    } else {
        let sum: f64 = view.posts().map(|p| p.engagement_score).sum();
        let max = view
            .posts()
            .map(|p| p.engagement_score)
            .fold(f64::MIN, f64::max);
        (sum / total_posts as f64, max)
    };

    OverallStats {
        total_posts,
        total_likes,
        total_comments,
        avg_engagement,
        max_engagement,
    }
}

/// The most-liked users with a dense rank over their like totals.
pub fn top_engaged_users(view: &StoreView<'_>) -> Vec<EngagedUser> {
    let mut users: Vec<_> = view
        .users()
        .map(|u| (u.username.clone(), u.total_likes_received))
        .collect();
    users.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut rows = Vec::new();
    let mut rank = 0u32;
    let mut last_total = None;
    for (username, total_likes_received) in users.into_iter().take(TOP_ENGAGED_LIMIT) {
        if last_total != Some(total_likes_received) {
            rank += 1;
            last_total = Some(total_likes_received);
        }
        rows.push(EngagedUser {
            username,
            total_likes_received,
            rank,
        });
    }
    rows
}
