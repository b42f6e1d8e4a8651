use crate::database::client::Db;
use crate::database::table_names::{POSTS_TABLE_NAME, POST_LIKES_TABLE_NAME};
use crate::entities::post_like::PostLike;
use crate::error::AppResult;
use crate::interfaces::repositories::like::LikesRepositoryInterface;
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Debug)]
pub struct LikesRepository {
    client: Arc<Db>,
}

impl LikesRepository {
    pub fn new(client: Arc<Db>) -> Self {
        Self { client }
    }

    pub(in crate::database) async fn mutate_db(&self) -> AppResult<()> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {POSTS_TABLE_NAME} SCHEMAFULL PERMISSIONS NONE;
    DEFINE FIELD IF NOT EXISTS likes ON TABLE {POSTS_TABLE_NAME} TYPE int DEFAULT 0;
    DEFINE FIELD IF NOT EXISTS created_at ON TABLE {POSTS_TABLE_NAME} TYPE datetime DEFAULT time::now();

    DEFINE TABLE IF NOT EXISTS {POST_LIKES_TABLE_NAME} SCHEMAFULL PERMISSIONS NONE;
    DEFINE FIELD IF NOT EXISTS post_id ON TABLE {POST_LIKES_TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS user_id ON TABLE {POST_LIKES_TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS created_at ON TABLE {POST_LIKES_TABLE_NAME} TYPE datetime DEFAULT time::now();
    DEFINE INDEX IF NOT EXISTS post_user_unique_idx ON {POST_LIKES_TABLE_NAME} FIELDS post_id, user_id UNIQUE;

    DEFINE EVENT IF NOT EXISTS post_like_created ON TABLE {POST_LIKES_TABLE_NAME} WHEN $event = \"CREATE\" THEN (
        UPDATE type::thing(\"{POSTS_TABLE_NAME}\", $after.post_id) SET likes += 1
    );
    DEFINE EVENT IF NOT EXISTS post_like_deleted ON TABLE {POST_LIKES_TABLE_NAME} WHEN $event = \"DELETE\" THEN (
        UPDATE type::thing(\"{POSTS_TABLE_NAME}\", $before.post_id) SET likes = math::max([likes - 1, 0])
    );
    ");
        self.client.query(sql).await?.check()?;
        Ok(())
    }

    /// Seeds a post with zero likes.
    pub async fn create_post(&self, post_id: &str) -> AppResult<()> {
        self.client
            .query(format!(
                "CREATE type::thing(\"{POSTS_TABLE_NAME}\", $post_id) SET likes = 0;"
            ))
            .bind(("post_id", post_id.to_string()))
            .await?
            .check()?;
        Ok(())
    }
}

#[async_trait]
impl LikesRepositoryInterface for LikesRepository {
    async fn get_post_likes(&self, post_id: &str) -> AppResult<Option<i64>> {
        let mut res = self
            .client
            .query(format!(
                "SELECT VALUE likes FROM ONLY type::thing(\"{POSTS_TABLE_NAME}\", $post_id);"
            ))
            .bind(("post_id", post_id.to_string()))
            .await?;
        let likes = res.take::<Option<i64>>(0)?;
        Ok(likes)
    }

    async fn get_like(&self, post_id: &str, user_id: &str) -> AppResult<Option<PostLike>> {
        let mut res = self
            .client
            .query(format!(
                "SELECT post_id, user_id, created_at FROM {POST_LIKES_TABLE_NAME} \
                WHERE post_id=$post_id AND user_id=$user_id LIMIT 1;"
            ))
            .bind(("post_id", post_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await?;
        let likes = res.take::<Vec<PostLike>>(0)?;
        Ok(likes.into_iter().next())
    }

    async fn insert_like(&self, post_id: &str, user_id: &str) -> AppResult<()> {
        // the unique index on (post_id, user_id) rejects a second like
        self.client
            .query(format!(
                "CREATE {POST_LIKES_TABLE_NAME} SET post_id=$post_id, user_id=$user_id RETURN NONE;"
            ))
            .bind(("post_id", post_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await?
            .check()?;
        Ok(())
    }

    async fn delete_like(&self, post_id: &str, user_id: &str) -> AppResult<()> {
        self.client
            .query(format!(
                "DELETE {POST_LIKES_TABLE_NAME} WHERE post_id=$post_id AND user_id=$user_id;"
            ))
            .bind(("post_id", post_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await?
            .check()?;
        Ok(())
    }
}
