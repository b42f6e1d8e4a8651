#![allow(dead_code)]

pub mod mock_likes_repository;
pub mod test_with_db;

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fake::faker::internet::en::Username;
use fake::Fake;
use like_state::config::ControllerConfig;
use like_state::entities::change_event::{ChangeEvent, ChangeKind, RowImage};
use like_state::entities::like_state::LikeState;
use like_state::interfaces::notifier::NotifierInterface;
use like_state::services::broadcast_change_feed::BroadcastChangeFeed;
use like_state::services::like_controller::LikeController;
use like_state::utils::session_auth::SessionAuth;
use mock_likes_repository::MockLikesRepository;

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl NotifierInterface for RecordingNotifier {
    fn notify_error(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

pub struct TestController {
    pub controller: Arc<LikeController>,
    pub store: Arc<MockLikesRepository>,
    pub feed: Arc<BroadcastChangeFeed>,
    pub auth: Arc<SessionAuth>,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn fake_user_id() -> String {
    format!("user_{}", Username().fake::<String>())
}

pub fn create_test_controller(store: MockLikesRepository, user_id: Option<&str>) -> TestController {
    create_test_controller_with_config(store, user_id, ControllerConfig::default())
}

pub fn create_test_controller_with_config(
    store: MockLikesRepository,
    user_id: Option<&str>,
    config: ControllerConfig,
) -> TestController {
    let store = Arc::new(store);
    let feed = Arc::new(BroadcastChangeFeed::new(64));
    let auth = Arc::new(match user_id {
        Some(user_id) => SessionAuth::signed_in(user_id),
        None => SessionAuth::default(),
    });
    let notifier = Arc::new(RecordingNotifier::default());
    let controller = Arc::new(LikeController::new(
        store.clone(),
        feed.clone(),
        auth.clone(),
        notifier.clone(),
        config,
    ));
    TestController {
        controller,
        store,
        feed,
        auth,
        notifier,
    }
}

pub async fn wait_for_state(
    controller: &LikeController,
    check: impl FnMut(&LikeState) -> bool,
) -> LikeState {
    let mut states = controller.watch();
    let state = tokio::time::timeout(Duration::from_secs(5), states.wait_for(check))
        .await
        .expect("state not reached in time")
        .expect("controller dropped");
    *state
}

/// Waits until the store has seen `count` post count reads.
pub async fn wait_for_post_reads(store: &MockLikesRepository, count: usize) {
    for _ in 0..500 {
        if store.post_reads.load(Ordering::SeqCst) >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("post count read not issued in time");
}

/// Lets the change listener drain whatever was published.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

pub fn like_changed(kind: ChangeKind, post_id: &str, user_id: &str) -> ChangeEvent {
    ChangeEvent {
        table: "post_likes".to_string(),
        kind,
        row: RowImage {
            post_id: Some(post_id.to_string()),
            user_id: Some(user_id.to_string()),
            ..Default::default()
        },
    }
}

pub fn post_updated(post_id: &str, likes: Option<i64>) -> ChangeEvent {
    ChangeEvent {
        table: "posts".to_string(),
        kind: ChangeKind::Update,
        row: RowImage {
            id: Some(post_id.to_string()),
            likes,
            ..Default::default()
        },
    }
}
