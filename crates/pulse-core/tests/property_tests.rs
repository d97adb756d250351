//! Property-based tests for engagement counter maintenance.

use chrono::Utc;
use proptest::prelude::*;

use pulse_core::{EngagementMaintainer, Post, ScoreWeights, User};

fn fresh_post(user_id: u64) -> Post {
    Post {
        id: 1,
        user_id,
        content: "content".to_string(),
        created_at: Utc::now(),
        like_count: 0,
        comment_count: 0,
        engagement_score: 0.0,
    }
}

fn fresh_user(id: u64) -> User {
    User {
        id,
        username: format!("user{id}"),
        email: format!("user{id}@example.com"),
        full_name: "User".to_string(),
        created_at: Utc::now(),
        total_likes_received: 0,
        total_comments_received: 0,
    }
}

fn weights() -> impl Strategy<Value = ScoreWeights> {
    (0.0..100.0f64, 0.0..100.0f64).prop_map(|(like_weight, comment_weight)| ScoreWeights {
        like_weight,
        comment_weight,
    })
}

proptest! {
    // The score formula holds after any interleaving of likes and comments.
    #[test]
    fn score_matches_formula_after_any_mutation_sequence(
        w in weights(),
        ops in prop::collection::vec(prop::bool::ANY, 0..50),
    ) {
        let maintainer = EngagementMaintainer::new(w);
        let mut post = fresh_post(1);
        let mut owner = fresh_user(1);

        for is_like in ops {
            if is_like {
                maintainer.apply_like(&mut post, &mut owner);
            } else {
                maintainer.apply_comment(&mut post, &mut owner);
            }
            let expected = maintainer.score(post.like_count, post.comment_count);
            prop_assert_eq!(post.engagement_score, expected);
        }

        prop_assert_eq!(owner.total_likes_received, post.like_count);
        prop_assert_eq!(owner.total_comments_received, post.comment_count);
    }

    // Reverting every applied like restores the exact zero-like state.
    #[test]
    fn reverting_all_likes_restores_initial_counters(
        w in weights(),
        likes in 0u64..40,
    ) {
        let maintainer = EngagementMaintainer::new(w);
        let mut post = fresh_post(1);
        let mut owner = fresh_user(1);

        for _ in 0..likes {
            maintainer.apply_like(&mut post, &mut owner);
        }
        for _ in 0..likes {
            maintainer.revert_like(&mut post, &mut owner);
        }

        prop_assert_eq!(post.like_count, 0);
        prop_assert_eq!(owner.total_likes_received, 0);
        prop_assert_eq!(post.engagement_score, maintainer.score(0, 0));
    }

    // Likes never affect comment counters and vice versa.
    #[test]
    fn counters_are_independent(
        likes in 0u64..30,
        comments in 0u64..30,
    ) {
        let maintainer = EngagementMaintainer::new(ScoreWeights::default());
        let mut post = fresh_post(1);
        let mut owner = fresh_user(1);

        for _ in 0..likes {
            maintainer.apply_like(&mut post, &mut owner);
        }
        for _ in 0..comments {
            maintainer.apply_comment(&mut post, &mut owner);
        }

        prop_assert_eq!(post.like_count, likes);
        prop_assert_eq!(post.comment_count, comments);
        prop_assert_eq!(
            post.engagement_score,
            1.0 * likes as f64 + 2.0 * comments as f64
        );
    }
}
