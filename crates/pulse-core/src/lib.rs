//! Core entity storage and engagement maintenance for Pulse.
//!
//! This crate owns the durable records (Users, Posts, Likes, Comments) and
//! the derived counters that make them queryable: every write commits its
//! raw row and its counter updates as one atomic unit, so the analytics
//! layer in `pulse-engine` can trust what it reads.

pub mod config;
pub mod error;
pub mod maintainer;
pub mod store;
pub mod types;

pub use config::{EngineConfig, ScoreWeights, TierThresholds};
pub use error::StoreError;
pub use maintainer::EngagementMaintainer;
pub use store::{EntityStore, StoreView};
pub use types::{
    Comment, CommentId, Like, LikeId, NewComment, NewLike, NewPost, NewUser, Post, PostId, User,
    UserId,
};
