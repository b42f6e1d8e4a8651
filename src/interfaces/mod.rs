pub mod auth;
pub mod change_feed;
pub mod notifier;
pub mod repositories;
