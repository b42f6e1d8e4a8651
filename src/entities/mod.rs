pub mod change_event;
pub mod like_state;
pub mod post_like;
