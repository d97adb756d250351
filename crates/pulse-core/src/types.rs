//! Entity records and write-request types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned identifier for a user.
pub type UserId = u64;
/// Store-assigned identifier for a post.
pub type PostId = u64;
/// Store-assigned identifier for a like.
pub type LikeId = u64;
/// Store-assigned identifier for a comment.
pub type CommentId = u64;

/// A registered user.
///
/// Immutable after creation except for the received-engagement totals,
/// which are owned exclusively by the [`EngagementMaintainer`].
///
/// [`EngagementMaintainer`]: crate::maintainer::EngagementMaintainer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
    /// Likes received across all of this user's posts. Derived.
    pub total_likes_received: u64,
    /// Comments received across all of this user's posts. Derived.
    pub total_comments_received: u64,
}

/// A post with its derived engagement counters.
///
/// `like_count`, `comment_count`, and `engagement_score` are derived
/// fields: they always equal the live Like/Comment rows referencing this
/// post, and only the engagement maintainer writes them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub user_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub like_count: u64,
    pub comment_count: u64,
    pub engagement_score: f64,
}

/// A like on a post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Like {
    pub id: LikeId,
    pub post_id: PostId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// A comment on a post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub user_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Request payload for creating a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: String,
}

/// Request payload for creating a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPost {
    pub user_id: UserId,
    pub content: String,
}

/// Request payload for creating or removing a like.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLike {
    pub post_id: PostId,
    pub user_id: UserId,
}

/// Request payload for creating a comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComment {
    pub post_id: PostId,
    pub user_id: UserId,
    pub content: String,
}
