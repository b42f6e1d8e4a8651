use crate::entities::post_like::PostLike;
use crate::error::AppResult;
use async_trait::async_trait;

/// Row access the like controller needs on `posts` and `post_likes`.
#[async_trait]
pub trait LikesRepositoryInterface {
    /// The stored `posts.likes` value, `None` when the post or the field is missing.
    async fn get_post_likes(&self, post_id: &str) -> AppResult<Option<i64>>;
    async fn get_like(&self, post_id: &str, user_id: &str) -> AppResult<Option<PostLike>>;
    async fn insert_like(&self, post_id: &str, user_id: &str) -> AppResult<()>;
    async fn delete_like(&self, post_id: &str, user_id: &str) -> AppResult<()>;
}
