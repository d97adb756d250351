//! In-memory entity store with transactional counter maintenance.
//!
//! All mutations run under a single write lock, so a raw write (a Like row)
//! and its derived-counter update (the post's `like_count`, the owner's
//! received totals) commit as one atomic unit. Readers take the read lock
//! and observe a consistent point-in-time view: a like is never visible
//! without its counter increment, and two concurrent likes on the same
//! post can never lose an update.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::{debug, info};

use crate::config::ScoreWeights;
use crate::error::StoreError;
use crate::maintainer::EngagementMaintainer;
use crate::types::{
    Comment, CommentId, Like, LikeId, NewComment, NewLike, NewPost, NewUser, Post, PostId, User,
    UserId,
};

/// Minimal `local@domain.tld` shape check. Full RFC 5322 parsing is not the
/// point; rejecting obviously malformed addresses is.
static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static regex"));

#[derive(Default)]
struct StoreInner {
    users: BTreeMap<UserId, User>,
    posts: BTreeMap<PostId, Post>,
    likes: BTreeMap<LikeId, Like>,
    comments: BTreeMap<CommentId, Comment>,
    /// Username -> user id, for uniqueness checks.
    usernames: HashMap<String, UserId>,
    /// Email -> user id, for uniqueness checks.
    emails: HashMap<String, UserId>,
    /// (post, user) -> like id. Enforces one like per user per post and
    /// makes unlike an O(1) lookup.
    like_pairs: HashMap<(PostId, UserId), LikeId>,
    next_user_id: u64,
    next_post_id: u64,
    next_like_id: u64,
    next_comment_id: u64,
}

/// Thread-safe store for Users, Posts, Likes, and Comments.
///
/// The store owns the [`EngagementMaintainer`] and invokes it inside its
/// write-lock critical section, making trigger-style counter maintenance
/// an explicit, testable part of every mutation.
pub struct EntityStore {
    maintainer: EngagementMaintainer,
    inner: RwLock<StoreInner>,
}

impl EntityStore {
    /// Create an empty store scoring with the given weights.
    pub fn new(weights: ScoreWeights) -> Self {
        Self {
            maintainer: EngagementMaintainer::new(weights),
            inner: RwLock::new(StoreInner::default()),
        }
    }

    /// The maintainer this store applies on writes.
    pub fn maintainer(&self) -> &EngagementMaintainer {
        &self.maintainer
    }

    /// Acquire a consistent point-in-time view for analytical reads.
    ///
    /// The view holds the store read lock: all data read through one view
    /// comes from a single consistent state, but writers are blocked while
    /// it is held, so views should be short-lived.
    pub async fn view(&self) -> StoreView<'_> {
        StoreView {
            inner: self.inner.read().await,
        }
    }

    /// Create a user.
    ///
    /// Fails with `Validation` on empty fields or a malformed email, and
    /// with `Conflict` if the username or email is already taken.
    pub async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let username = new.username.trim().to_string();
        let email = new.email.trim().to_string();
        let full_name = new.full_name.trim().to_string();

        if username.is_empty() {
            return Err(StoreError::Validation("username must not be empty".into()));
        }
        if full_name.is_empty() {
            return Err(StoreError::Validation("full_name must not be empty".into()));
        }
        if !EMAIL_SHAPE.is_match(&email) {
            return Err(StoreError::Validation(format!(
                "malformed email address: {email:?}"
            )));
        }

        let mut inner = self.inner.write().await;
        if inner.usernames.contains_key(&username) {
            return Err(StoreError::Conflict(format!(
                "username {username:?} is already taken"
            )));
        }
        if inner.emails.contains_key(&email) {
            return Err(StoreError::Conflict(format!(
                "email {email:?} is already registered"
            )));
        }

        inner.next_user_id += 1;
        let user = User {
            id: inner.next_user_id,
            username: username.clone(),
            email: email.clone(),
            full_name,
            created_at: Utc::now(),
            total_likes_received: 0,
            total_comments_received: 0,
        };
        inner.usernames.insert(username, user.id);
        inner.emails.insert(email, user.id);
        inner.users.insert(user.id, user.clone());

        debug!(user_id = user.id, username = %user.username, "created user");
        Ok(user)
    }

    /// Look up a user by id.
    pub async fn get_user(&self, id: UserId) -> Result<User, StoreError> {
        let inner = self.inner.read().await;
        inner
            .users
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound { entity: "user", id })
    }

    /// All users, newest first.
    pub async fn list_users(&self) -> Vec<User> {
        let inner = self.inner.read().await;
        // Ids are assigned in creation order, so reverse id order is newest-first.
        inner.users.values().rev().cloned().collect()
    }

    /// Delete a user.
    ///
    /// Rejected with `Conflict` while the user still owns posts or has
    /// authored likes/comments, so no row is ever left with a dangling
    /// owner reference.
    pub async fn delete_user(&self, id: UserId) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&id) {
            return Err(StoreError::NotFound { entity: "user", id });
        }

        let owned_posts = inner.posts.values().filter(|p| p.user_id == id).count();
        let authored_likes = inner.likes.values().filter(|l| l.user_id == id).count();
        let authored_comments = inner.comments.values().filter(|c| c.user_id == id).count();
        if owned_posts + authored_likes + authored_comments > 0 {
            return Err(StoreError::Conflict(format!(
                "user {id} still has {owned_posts} posts, {authored_likes} likes, \
                 {authored_comments} comments"
            )));
        }

        let user = inner.users.remove(&id).ok_or(StoreError::NotFound {
            entity: "user",
            id,
        })?;
        inner.usernames.remove(&user.username);
        inner.emails.remove(&user.email);

        info!(user_id = id, username = %user.username, "deleted user");
        Ok(())
    }

    /// Create a post owned by an existing user.
    pub async fn create_post(&self, new: NewPost) -> Result<Post, StoreError> {
        let content = new.content.trim().to_string();
        if content.is_empty() {
            return Err(StoreError::Validation("content must not be empty".into()));
        }

        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&new.user_id) {
            return Err(StoreError::NotFound {
                entity: "user",
                id: new.user_id,
            });
        }

        inner.next_post_id += 1;
        let post = Post {
            id: inner.next_post_id,
            user_id: new.user_id,
            content,
            created_at: Utc::now(),
            like_count: 0,
            comment_count: 0,
            engagement_score: 0.0,
        };
        inner.posts.insert(post.id, post.clone());

        debug!(post_id = post.id, user_id = post.user_id, "created post");
        Ok(post)
    }

    /// All posts with live counters, newest first.
    pub async fn list_posts(&self) -> Vec<Post> {
        let inner = self.inner.read().await;
        inner.posts.values().rev().cloned().collect()
    }

    /// Like a post.
    ///
    /// The like row, the post's counter bump, and the owner's received
    /// total commit atomically. A second like from the same user on the
    /// same post is rejected with `Conflict`.
    pub async fn create_like(&self, new: NewLike) -> Result<Like, StoreError> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        if !inner.users.contains_key(&new.user_id) {
            return Err(StoreError::NotFound {
                entity: "user",
                id: new.user_id,
            });
        }
        let owner_id = inner
            .posts
            .get(&new.post_id)
            .map(|p| p.user_id)
            .ok_or(StoreError::NotFound {
                entity: "post",
                id: new.post_id,
            })?;
        if inner.like_pairs.contains_key(&(new.post_id, new.user_id)) {
            return Err(StoreError::Conflict(format!(
                "user {} already liked post {}",
                new.user_id, new.post_id
            )));
        }

        inner.next_like_id += 1;
        let like = Like {
            id: inner.next_like_id,
            post_id: new.post_id,
            user_id: new.user_id,
            created_at: Utc::now(),
        };
        inner.like_pairs.insert((like.post_id, like.user_id), like.id);
        inner.likes.insert(like.id, like.clone());

        // Counter maintenance inside the same critical section as the insert.
        let owner = inner.users.get_mut(&owner_id).ok_or(StoreError::NotFound {
            entity: "user",
            id: owner_id,
        })?;
        let post = inner.posts.get_mut(&like.post_id).ok_or(StoreError::NotFound {
            entity: "post",
            id: like.post_id,
        })?;
        self.maintainer.apply_like(post, owner);

        debug!(
            like_id = like.id,
            post_id = like.post_id,
            user_id = like.user_id,
            "created like"
        );
        Ok(like)
    }

    /// Remove a user's like from a post, reverting its counter effects.
    pub async fn remove_like(&self, post_id: PostId, user_id: UserId) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        let like_id =
            inner
                .like_pairs
                .remove(&(post_id, user_id))
                .ok_or(StoreError::NotFound {
                    entity: "like",
                    id: post_id,
                })?;
        inner.likes.remove(&like_id);

        let owner_id = inner
            .posts
            .get(&post_id)
            .map(|p| p.user_id)
            .ok_or(StoreError::NotFound {
                entity: "post",
                id: post_id,
            })?;
        let owner = inner.users.get_mut(&owner_id).ok_or(StoreError::NotFound {
            entity: "user",
            id: owner_id,
        })?;
        let post = inner.posts.get_mut(&post_id).ok_or(StoreError::NotFound {
            entity: "post",
            id: post_id,
        })?;
        self.maintainer.revert_like(post, owner);

        debug!(like_id, post_id, user_id, "removed like");
        Ok(())
    }

    /// Comment on a post.
    ///
    /// Same atomicity contract as [`create_like`].
    ///
    /// [`create_like`]: EntityStore::create_like
    pub async fn create_comment(&self, new: NewComment) -> Result<Comment, StoreError> {
        let content = new.content.trim().to_string();
        if content.is_empty() {
            return Err(StoreError::Validation("content must not be empty".into()));
        }

        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        if !inner.users.contains_key(&new.user_id) {
            return Err(StoreError::NotFound {
                entity: "user",
                id: new.user_id,
            });
        }
        let owner_id = inner
            .posts
            .get(&new.post_id)
            .map(|p| p.user_id)
            .ok_or(StoreError::NotFound {
                entity: "post",
                id: new.post_id,
            })?;

        inner.next_comment_id += 1;
        let comment = Comment {
            id: inner.next_comment_id,
            post_id: new.post_id,
            user_id: new.user_id,
            content,
            created_at: Utc::now(),
        };
        inner.comments.insert(comment.id, comment.clone());

        let owner = inner.users.get_mut(&owner_id).ok_or(StoreError::NotFound {
            entity: "user",
            id: owner_id,
        })?;
        let post = inner
            .posts
            .get_mut(&comment.post_id)
            .ok_or(StoreError::NotFound {
                entity: "post",
                id: comment.post_id,
            })?;
        self.maintainer.apply_comment(post, owner);

        debug!(
            comment_id = comment.id,
            post_id = comment.post_id,
            user_id = comment.user_id,
            "created comment"
        );
        Ok(comment)
    }

    /// Recount raw rows against every derived counter.
    ///
    /// Returns the first divergence found as `InternalConsistency`. Clean
    /// runs are the expected outcome; this exists so drift is detectable
    /// instead of silent.
    pub async fn audit(&self) -> Result<(), StoreError> {
        let inner = self.inner.read().await;

        for post in inner.posts.values() {
            let likes = inner.likes.values().filter(|l| l.post_id == post.id).count() as u64;
            let comments = inner
                .comments
                .values()
                .filter(|c| c.post_id == post.id)
                .count() as u64;
            if post.like_count != likes {
                return Err(StoreError::InternalConsistency {
                    post_id: post.id,
                    detail: format!("like_count {} but {} like rows", post.like_count, likes),
                });
            }
            if post.comment_count != comments {
                return Err(StoreError::InternalConsistency {
                    post_id: post.id,
                    detail: format!(
                        "comment_count {} but {} comment rows",
                        post.comment_count, comments
                    ),
                });
            }
            let expected = self.maintainer.score(likes, comments);
            if post.engagement_score != expected {
                return Err(StoreError::InternalConsistency {
                    post_id: post.id,
                    detail: format!(
                        "engagement_score {} but formula gives {}",
                        post.engagement_score, expected
                    ),
                });
            }
        }

        Ok(())
    }

    /// Overwrite a post's like count, bypassing the maintainer.
    ///
    /// Exists solely so tests can manufacture drift for `audit`.
    #[doc(hidden)]
    pub async fn corrupt_like_count(&self, post_id: PostId, count: u64) {
        let mut inner = self.inner.write().await;
        if let Some(post) = inner.posts.get_mut(&post_id) {
            post.like_count = count;
        }
    }
}

/// A consistent point-in-time view of the store.
///
/// Holds the store read lock for its lifetime.
pub struct StoreView<'a> {
    inner: RwLockReadGuard<'a, StoreInner>,
}

impl StoreView<'_> {
    /// Users in id (creation) order.
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.inner.users.values()
    }

    /// Posts in id (creation) order.
    pub fn posts(&self) -> impl Iterator<Item = &Post> {
        self.inner.posts.values()
    }

    /// Likes in id (creation) order.
    pub fn likes(&self) -> impl Iterator<Item = &Like> {
        self.inner.likes.values()
    }

    /// Comments in id (creation) order.
    pub fn comments(&self) -> impl Iterator<Item = &Comment> {
        self.inner.comments.values()
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.inner.users.get(&id)
    }

    pub fn post(&self, id: PostId) -> Option<&Post> {
        self.inner.posts.get(&id)
    }

    pub fn user_count(&self) -> usize {
        self.inner.users.len()
    }

    pub fn post_count(&self) -> usize {
        self.inner.posts.len()
    }

    pub fn like_count(&self) -> usize {
        self.inner.likes.len()
    }

    pub fn comment_count(&self) -> usize {
        self.inner.comments.len()
    }
}
