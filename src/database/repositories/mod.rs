pub mod like;
pub mod live_changes;
