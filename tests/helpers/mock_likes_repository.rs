use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use like_state::entities::post_like::PostLike;
use like_state::error::{AppError, AppResult};
use like_state::interfaces::repositories::like::LikesRepositoryInterface;
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteCall {
    Insert { post_id: String, user_id: String },
    Delete { post_id: String, user_id: String },
}

/// Store double that counts every call and can fail or hold requests.
pub struct MockLikesRepository {
    pub likes: Mutex<Option<i64>>,
    pub liked_by: Mutex<HashSet<(String, String)>>,
    pub writes: Mutex<Vec<WriteCall>>,
    pub post_reads: AtomicUsize,
    pub like_reads: AtomicUsize,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    // true while writes are held
    write_gate: watch::Sender<bool>,
    // true while post count reads are held
    read_gate: watch::Sender<bool>,
}

impl Default for MockLikesRepository {
    fn default() -> Self {
        Self {
            likes: Mutex::new(None),
            liked_by: Mutex::new(HashSet::new()),
            writes: Mutex::new(Vec::new()),
            post_reads: AtomicUsize::new(0),
            like_reads: AtomicUsize::new(0),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            write_gate: watch::Sender::new(false),
            read_gate: watch::Sender::new(false),
        }
    }
}

impl MockLikesRepository {
    pub fn with_likes(likes: i64) -> Self {
        let repo = Self::default();
        *repo.likes.lock().unwrap() = Some(likes);
        repo
    }

    pub fn liked(self, post_id: &str, user_id: &str) -> Self {
        self.liked_by
            .lock()
            .unwrap()
            .insert((post_id.to_string(), user_id.to_string()));
        self
    }

    pub fn set_likes(&self, likes: i64) {
        *self.likes.lock().unwrap() = Some(likes);
    }

    pub fn reads(&self) -> usize {
        self.post_reads.load(Ordering::SeqCst) + self.like_reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> Vec<WriteCall> {
        self.writes.lock().unwrap().clone()
    }

    /// Writes block until `release_writes` is called.
    pub fn hold_writes(&self) {
        self.write_gate.send_replace(true);
    }

    pub fn release_writes(&self) {
        self.write_gate.send_replace(false);
    }

    /// Post count reads answer with the count seen when they were issued, but
    /// only once `release_reads` is called.
    pub fn hold_reads(&self) {
        self.read_gate.send_replace(true);
    }

    pub fn release_reads(&self) {
        self.read_gate.send_replace(false);
    }

    async fn before_write(&self, call: WriteCall) -> AppResult<()> {
        self.writes.lock().unwrap().push(call);
        let mut gate = self.write_gate.subscribe();
        let _ = gate.wait_for(|held| !held).await;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::SurrealDb {
                source: "write refused".to_string(),
            });
        }
        Ok(())
    }

    fn read_failure(&self) -> AppResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::SurrealDb {
                source: "read refused".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl LikesRepositoryInterface for MockLikesRepository {
    async fn get_post_likes(&self, _post_id: &str) -> AppResult<Option<i64>> {
        let likes = *self.likes.lock().unwrap();
        self.post_reads.fetch_add(1, Ordering::SeqCst);
        let mut gate = self.read_gate.subscribe();
        let _ = gate.wait_for(|held| !held).await;
        self.read_failure()?;
        Ok(likes)
    }

    async fn get_like(&self, post_id: &str, user_id: &str) -> AppResult<Option<PostLike>> {
        self.like_reads.fetch_add(1, Ordering::SeqCst);
        self.read_failure()?;
        let key = (post_id.to_string(), user_id.to_string());
        Ok(self.liked_by.lock().unwrap().contains(&key).then(|| PostLike {
            post_id: post_id.to_string(),
            user_id: user_id.to_string(),
            created_at: None,
        }))
    }

    async fn insert_like(&self, post_id: &str, user_id: &str) -> AppResult<()> {
        self.before_write(WriteCall::Insert {
            post_id: post_id.to_string(),
            user_id: user_id.to_string(),
        })
        .await?;
        self.liked_by
            .lock()
            .unwrap()
            .insert((post_id.to_string(), user_id.to_string()));
        let mut likes = self.likes.lock().unwrap();
        *likes = Some(likes.unwrap_or(0) + 1);
        Ok(())
    }

    async fn delete_like(&self, post_id: &str, user_id: &str) -> AppResult<()> {
        self.before_write(WriteCall::Delete {
            post_id: post_id.to_string(),
            user_id: user_id.to_string(),
        })
        .await?;
        self.liked_by
            .lock()
            .unwrap()
            .remove(&(post_id.to_string(), user_id.to_string()));
        let mut likes = self.likes.lock().unwrap();
        *likes = Some((likes.unwrap_or(0) - 1).max(0));
        Ok(())
    }
}
