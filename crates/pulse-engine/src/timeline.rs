//! Unified activity timeline.
//!
//! Merges post-created, like-added, and comment-added events into one
//! chronological feed. This is a duplicate-preserving union: every raw row
//! becomes exactly one timeline row and equivalent rows never collapse.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pulse_core::StoreView;

/// The kind of activity a timeline row represents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActivityKind {
    Post,
    Like,
    Comment,
}

/// One row of the merged activity feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Activity {
    pub activity_type: ActivityKind,
    /// Username of the acting user.
    pub username: String,
    /// The post's own content for Post rows; the referenced post's content
    /// for Like and Comment rows.
    pub content: String,
    pub occurred_at: DateTime<Utc>,
}

/// Merge all three activity kinds into one feed, newest first.
///
/// Rows with identical timestamps order by kind (Post, Like, Comment) and
/// then by source id so the merge is deterministic.
pub fn union_activities(view: &StoreView<'_>, limit: usize) -> Vec<Activity> {
    let username_of = |user_id| {
        view.user(user_id)
            .map(|u| u.username.clone())
            .unwrap_or_default()
    };
    let post_content_of = |post_id| {
        view.post(post_id)
            .map(|p| p.content.clone())
            .unwrap_or_default()
    };

    let mut rows: Vec<(ActivityKind, u64, Activity)> = Vec::with_capacity(
        view.post_count() + view.like_count() + view.comment_count(),
    );

    for post in view.posts() {
        rows.push((
            ActivityKind::Post,
            post.id,
            Activity {
                activity_type: ActivityKind::Post,
                username: username_of(post.user_id),
                content: post.content.clone(),
                occurred_at: post.created_at,
            },
        ));
    }
    for like in view.likes() {
        rows.push((
            ActivityKind::Like,
            like.id,
            Activity {
                activity_type: ActivityKind::Like,
                username: username_of(like.user_id),
                content: post_content_of(like.post_id),
                occurred_at: like.created_at,
            },
        ));
    }
    for comment in view.comments() {
        rows.push((
            ActivityKind::Comment,
            comment.id,
            Activity {
                activity_type: ActivityKind::Comment,
                username: username_of(comment.user_id),
                content: post_content_of(comment.post_id),
                occurred_at: comment.created_at,
            },
        ));
    }

    rows.sort_by(|(kind_a, id_a, a), (kind_b, id_b, b)| {
        b.occurred_at
            .cmp(&a.occurred_at)
            .then_with(|| kind_a.cmp(kind_b))
            .then_with(|| id_a.cmp(id_b))
    });

    rows.into_iter()
        .take(limit)
        .map(|(_, _, activity)| activity)
        .collect()
}
