use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A `post_likes` row. Its existence is what "the user likes the post" means.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostLike {
    pub post_id: String,
    pub user_id: String,
    pub created_at: Option<DateTime<Utc>>,
}
