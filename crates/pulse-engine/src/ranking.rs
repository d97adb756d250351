//! Deterministic top-posts ranking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pulse_core::{PostId, StoreView, UserId};

/// One row of the top-posts view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedPost {
    /// 1-based sequential rank (ROW_NUMBER style: ties get distinct ranks).
    pub rank: u32,
    pub post_id: PostId,
    pub user_id: UserId,
    pub username: String,
    pub content: String,
    pub like_count: u64,
    pub comment_count: u64,
    pub engagement_score: f64,
    pub created_at: DateTime<Utc>,
}

/// Rank all posts by engagement score.
///
/// Ordered by score descending; ties broken by earliest creation time, then
/// by post id. The tie-break is a total order, so repeated calls over the
/// same data return an identical sequence.
pub fn top_posts(view: &StoreView<'_>, limit: usize) -> Vec<RankedPost> {
    let mut posts: Vec<_> = view.posts().collect();
    posts.sort_by(|a, b| {
        b.engagement_score
            .total_cmp(&a.engagement_score)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });

    posts
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, post)| RankedPost {
            rank: i as u32 + 1,
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
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::{EntityStore, NewLike, NewPost, NewUser, ScoreWeights};

    async fn seeded_store() -> EntityStore {
        let store = EntityStore::new(ScoreWeights::default());
        for name in ["alice", "bob", "carol"] {
            store
                .create_user(NewUser {
                    username: name.into(),
                    email: format!("{name}@example.com"),
                    full_name: name.into(),
                })
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn empty_store_ranks_to_empty_vec() {
        let store = seeded_store().await;
        let view = store.view().await;
        assert!(top_posts(&view, 10).is_empty());
    }

    #[tokio::test]
    async fn ordered_by_score_then_creation_time() {
        let store = seeded_store().await;
        // Post 1 (alice): 1 like. Post 2 (bob): 2 likes. Post 3 (carol): none.
        for user_id in 1..=3u64 {
            store
                .create_post(NewPost {
                    user_id,
                    content: format!("post by {user_id}"),
                })
                .await
                .unwrap();
        }
        store
            .create_like(NewLike { post_id: 1, user_id: 2 })
            .await
            .unwrap();
        store
            .create_like(NewLike { post_id: 2, user_id: 1 })
            .await
            .unwrap();
        store
            .create_like(NewLike { post_id: 2, user_id: 3 })
            .await
            .unwrap();

        let view = store.view().await;
        let ranked = top_posts(&view, 10);
        let order: Vec<_> = ranked.iter().map(|r| (r.rank, r.post_id)).collect();
        assert_eq!(order, vec![(1, 2), (2, 1), (3, 3)]);
        assert_eq!(ranked[0].username, "bob");
    }

    #[tokio::test]
    async fn equal_scores_break_ties_by_earliest_post() {
        let store = seeded_store().await;
        for i in 0..4u64 {
            store
                .create_post(NewPost {
                    user_id: 1,
                    content: format!("zero engagement {i}"),
                })
                .await
                .unwrap();
        }

        let view = store.view().await;
        let ranked = top_posts(&view, 10);
        let ids: Vec<_> = ranked.iter().map(|r| r.post_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn repeated_calls_are_identical() {
        let store = seeded_store().await;
        for i in 0..5u64 {
            store
                .create_post(NewPost {
                    user_id: i % 3 + 1,
                    content: format!("post {i}"),
                })
                .await
                .unwrap();
        }
        store
            .create_like(NewLike { post_id: 3, user_id: 1 })
            .await
            .unwrap();

        let view = store.view().await;
        assert_eq!(top_posts(&view, 10), top_posts(&view, 10));
    }

    #[tokio::test]
    async fn limit_truncates_after_ordering() {
        let store = seeded_store().await;
        for i in 0..5u64 {
            store
                .create_post(NewPost {
                    user_id: 1,
                    content: format!("post {i}"),
                })
                .await
                .unwrap();
        }
        store
            .create_like(NewLike { post_id: 5, user_id: 2 })
            .await
            .unwrap();

        let view = store.view().await;
        let ranked = top_posts(&view, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].post_id, 5);
        assert_eq!(ranked[1].post_id, 1);
    }
}
