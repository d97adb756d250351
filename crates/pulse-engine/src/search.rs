//! Substring search over post content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pulse_core::{PostId, StoreView, UserId};

use crate::error::AnalyticsError;

/// A post matching a search query, augmented with its owner's username.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub post_id: PostId,
    pub user_id: UserId,
    pub username: String,
    pub content: String,
    pub like_count: u64,
    pub comment_count: u64,
    pub engagement_score: f64,
    pub created_at: DateTime<Utc>,
}

/// Find posts whose content contains `query` as a case-insensitive
/// substring, in creation order.
///
/// An empty or whitespace-only query is rejected: silently matching every
/// post would turn a guard slip in the caller into a full table dump.
pub fn search_posts(
    view: &StoreView<'_>,
    query: &str,
) -> Result<Vec<SearchHit>, AnalyticsError> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Err(AnalyticsError::InvalidArgument(
            "search query must not be empty".into(),
        ));
    }

    Ok(view
        .posts()
        .filter(|post| post.content.to_lowercase().contains(&needle))
        .map(|post| SearchHit {
            post_id: post.id,
            user_id: post.user_id,
            username: view
                .user(post.user_id)
                .map(|u| u.username.clone())
                .unwrap_or_default(),
            content: post.content.clone(),
            like_count: post.like_count,
            comment_count: post.comment_count,
            engagement_score: post.engagement_score,
            created_at: post.created_at,
        })
        .collect())
}
