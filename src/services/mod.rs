pub mod broadcast_change_feed;
pub mod like_controller;
