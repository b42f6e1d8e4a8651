use serde::Serialize;
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display)]
pub enum LikePhase {
    #[default]
    Idle,
    Writing,
}

/// What the UI renders for one bound post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LikeState {
    pub is_liked: bool,
    pub likes_count: u32,
    pub phase: LikePhase,
}

/// The values a failed write rolls back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeSnapshot {
    pub is_liked: bool,
    pub likes_count: u32,
}

impl LikeState {
    pub fn new(is_liked: bool, likes_count: u32) -> Self {
        Self {
            is_liked,
            likes_count,
            phase: LikePhase::Idle,
        }
    }

    pub fn loading(&self) -> bool {
        self.phase == LikePhase::Writing
    }

    pub fn snapshot(&self) -> LikeSnapshot {
        LikeSnapshot {
            is_liked: self.is_liked,
            likes_count: self.likes_count,
        }
    }

    /// Idle -> Writing with the optimistic flip applied.
    /// Returns `None` and leaves the state alone when a write is already running.
    pub(crate) fn begin_write(&mut self) -> Option<LikeSnapshot> {
        if self.loading() {
            return None;
        }
        let previous = self.snapshot();
        self.is_liked = !previous.is_liked;
        self.likes_count = if previous.is_liked {
            previous.likes_count.saturating_sub(1)
        } else {
            previous.likes_count.saturating_add(1)
        };
        self.phase = LikePhase::Writing;
        Some(previous)
    }

    /// Writing -> Idle, restoring `rollback` when the write failed.
    pub(crate) fn finish_write(&mut self, rollback: Option<LikeSnapshot>) {
        if let Some(previous) = rollback {
            self.is_liked = previous.is_liked;
            self.likes_count = previous.likes_count;
        }
        self.phase = LikePhase::Idle;
    }

    pub(crate) fn apply_status(&mut self, is_liked: bool, likes: i64) -> bool {
        let likes_count = likes_to_count(likes);
        let changed = self.is_liked != is_liked || self.likes_count != likes_count;
        self.is_liked = is_liked;
        self.likes_count = likes_count;
        changed
    }

    pub(crate) fn apply_count(&mut self, likes: i64) -> bool {
        let likes_count = likes_to_count(likes);
        let changed = self.likes_count != likes_count;
        self.likes_count = likes_count;
        changed
    }
}

fn likes_to_count(likes: i64) -> u32 {
    u32::try_from(likes.max(0)).unwrap_or(u32::MAX)
}
