pub const POSTS_TABLE_NAME: &'static str = "posts";
pub const POST_LIKES_TABLE_NAME: &'static str = "post_likes";
