use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use futures::stream::BoxStream;
use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::ControllerConfig;
use crate::database::table_names::{POSTS_TABLE_NAME, POST_LIKES_TABLE_NAME};
use crate::entities::change_event::{
    ChangeEvent, ChangeFilter, ChangeKind, EventFilter, RowPredicate,
};
use crate::entities::like_state::LikeState;
use crate::error::{AppError, AppResult};
use crate::interfaces::auth::AuthInterface;
use crate::interfaces::change_feed::{ChangeFeedInterface, SubscriptionHandle};
use crate::interfaces::notifier::NotifierInterface;
use crate::interfaces::repositories::like::LikesRepositoryInterface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The write succeeded and the optimistic value stands.
    Committed,
    /// The write failed and the previous value was restored.
    RolledBack,
    /// No signed-in user or no bound post.
    Rejected,
    /// Another write was still in flight.
    Ignored,
    /// The post was unbound while the write was running.
    Cancelled,
}

/// Keeps the like flag and counter of one post in sync with the store and with
/// other clients.
///
/// Every state change goes through the `watch` channel, so `toggle_like` and the
/// reconciliation path check-and-set the same value. Reconciliation only lands
/// while no write is running and no write started since it began.
pub struct LikeController {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn LikesRepositoryInterface + Send + Sync>,
    feed: Arc<dyn ChangeFeedInterface + Send + Sync>,
    auth: Arc<dyn AuthInterface + Send + Sync>,
    notifier: Arc<dyn NotifierInterface + Send + Sync>,
    config: ControllerConfig,
    state: watch::Sender<LikeState>,
    binding: Mutex<Option<Binding>>,
    // bumped on every bind and release
    generation: AtomicU64,
    // bumped on every write that starts
    write_epoch: AtomicU64,
}

#[derive(Debug, Clone)]
struct BindingRef {
    post_id: String,
    generation: u64,
    token: CancellationToken,
}

struct Binding {
    current: BindingRef,
    subscription: Option<SubscriptionHandle>,
    listener: Option<JoinHandle<()>>,
}

enum Reconcile {
    Refetch,
    Count(i64),
}

impl LikeController {
    pub fn new(
        store: Arc<dyn LikesRepositoryInterface + Send + Sync>,
        feed: Arc<dyn ChangeFeedInterface + Send + Sync>,
        auth: Arc<dyn AuthInterface + Send + Sync>,
        notifier: Arc<dyn NotifierInterface + Send + Sync>,
        config: ControllerConfig,
    ) -> Self {
        let (state, _) = watch::channel(LikeState::default());
        Self {
            inner: Arc::new(Inner {
                store,
                feed,
                auth,
                notifier,
                config,
                state,
                binding: Mutex::new(None),
                generation: AtomicU64::new(0),
                write_epoch: AtomicU64::new(0),
            }),
        }
    }

    pub fn state(&self) -> LikeState {
        *self.inner.state.borrow()
    }

    /// Receiver that sees every state transition, for re-rendering.
    pub fn watch(&self) -> watch::Receiver<LikeState> {
        self.inner.state.subscribe()
    }

    pub fn post_id(&self) -> Option<String> {
        self.inner.current().map(|binding| binding.post_id)
    }

    /// Switches the controller to `post_id`: releases the previous post, resets
    /// the state, subscribes to the post's changes and fetches its status.
    /// Binding the post that is already bound does nothing.
    pub async fn bind(&self, post_id: Option<&str>) {
        if self.post_id().as_deref() == post_id {
            return;
        }
        self.inner.release().await;
        self.inner.state.send_replace(LikeState::default());

        let Some(post_id) = post_id else {
            return;
        };
        let current = BindingRef {
            post_id: post_id.to_string(),
            generation: self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1,
            token: CancellationToken::new(),
        };
        *self.inner.lock_binding() = Some(Binding {
            current: current.clone(),
            subscription: None,
            listener: None,
        });
        info!(post_id, "bound like controller");

        self.inner.subscribe(current).await;
        self.fetch_status().await;
    }

    /// Releases the bound post and its change subscription.
    pub async fn teardown(&self) {
        self.bind(None).await;
    }

    /// Reads the like count and the user's like record and applies them.
    /// Failures are logged and leave the state as it was.
    pub async fn fetch_status(&self) {
        self.inner.reconcile(Reconcile::Refetch).await;
    }

    /// Optimistically flips the like, then inserts or deletes the like record.
    /// A failed write restores the previous state and notifies the user.
    pub async fn toggle_like(&self) -> ToggleOutcome {
        let inner = &self.inner;
        let Some(user_id) = inner.auth.current_user_id() else {
            warn!("like toggle rejected, nobody is signed in");
            inner.notifier.notify_error(&AppError::Unauthenticated.to_string());
            return ToggleOutcome::Rejected;
        };
        let Some(binding) = inner.current() else {
            warn!(user_id, "like toggle rejected, no post bound");
            inner.notifier.notify_error(&AppError::PostNotBound.to_string());
            return ToggleOutcome::Rejected;
        };

        let mut previous = None;
        inner.state.send_if_modified(|state| {
            if !inner.is_current(&binding) {
                return false;
            }
            previous = state.begin_write();
            if previous.is_some() {
                inner.write_epoch.fetch_add(1, Ordering::SeqCst);
            }
            previous.is_some()
        });
        let Some(previous) = previous else {
            debug!(post_id = %binding.post_id, "like write already in flight");
            return ToggleOutcome::Ignored;
        };

        let post_id = binding.post_id.as_str();
        let deadline = inner.config.write_timeout;
        let (action, result) = if previous.is_liked {
            let request = inner.store.delete_like(post_id, &user_id);
            let result = guarded(&binding.token, deadline, "delete like", request).await;
            ("unlike", result)
        } else {
            let request = inner.store.insert_like(post_id, &user_id);
            let result = guarded(&binding.token, deadline, "insert like", request).await;
            ("like", result)
        };

        let (outcome, rollback) = match result {
            Ok(()) => {
                debug!(post_id, user_id, action, "like write committed");
                (ToggleOutcome::Committed, None)
            }
            Err(AppError::Cancelled) => {
                debug!(post_id, user_id, action, "like write cancelled");
                (ToggleOutcome::Cancelled, Some(previous))
            }
            Err(err) => {
                error!(post_id, user_id, action, error = ?err, "like write failed");
                inner
                    .notifier
                    .notify_error(&format!("Could not {action} the post, please try again"));
                (ToggleOutcome::RolledBack, Some(previous))
            }
        };

        inner.state.send_if_modified(|state| {
            if !inner.is_current(&binding) {
                return false;
            }
            state.finish_write(rollback);
            true
        });
        outcome
    }
}

impl Drop for LikeController {
    fn drop(&mut self) {
        let Some(binding) = self.inner.lock_binding().take() else {
            return;
        };
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        binding.current.token.cancel();
        if let Some(listener) = binding.listener {
            listener.abort();
        }
        let Some(handle) = binding.subscription else {
            return;
        };
        let feed = self.inner.feed.clone();
        let post_id = binding.current.post_id;
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    if let Err(err) = feed.unsubscribe(handle).await {
                        warn!(post_id, error = ?err, "failed to release change subscription");
                    }
                });
            }
            Err(_) => warn!(post_id, "no runtime left to release change subscription"),
        }
    }
}

impl Inner {
    fn lock_binding(&self) -> MutexGuard<'_, Option<Binding>> {
        self.binding.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current(&self) -> Option<BindingRef> {
        self.lock_binding().as_ref().map(|binding| binding.current.clone())
    }

    fn is_current(&self, binding: &BindingRef) -> bool {
        self.generation.load(Ordering::SeqCst) == binding.generation
    }

    async fn release(&self) {
        let Some(binding) = self.lock_binding().take() else {
            return;
        };
        self.generation.fetch_add(1, Ordering::SeqCst);
        binding.current.token.cancel();
        if let Some(listener) = binding.listener {
            listener.abort();
        }
        if let Some(handle) = binding.subscription {
            if let Err(err) = self.feed.unsubscribe(handle).await {
                warn!(
                    post_id = %binding.current.post_id,
                    error = ?err,
                    "failed to release change subscription"
                );
            }
        }
        info!(post_id = %binding.current.post_id, "released like controller");
    }

    async fn subscribe(self: &Arc<Self>, current: BindingRef) {
        let post_id = current.post_id.as_str();
        let filters = vec![
            ChangeFilter::new(
                POST_LIKES_TABLE_NAME,
                EventFilter::Any,
                RowPredicate::eq("post_id", post_id),
            ),
            ChangeFilter::new(
                POSTS_TABLE_NAME,
                EventFilter::Update,
                RowPredicate::eq("id", post_id),
            ),
        ];
        let topic = format!("post_likes:{post_id}");
        let subscription = match self.feed.subscribe(&topic, filters).await {
            Ok(subscription) => subscription,
            Err(err) => {
                error!(post_id, error = ?err, "failed to subscribe to like changes");
                return;
            }
        };

        let handle = subscription.handle;
        let listener = tokio::spawn(listen(
            Arc::downgrade(self),
            current.clone(),
            subscription.events,
        ));
        let stale = {
            let mut guard = self.lock_binding();
            match guard.as_mut() {
                Some(binding) if binding.current.generation == current.generation => {
                    binding.subscription = Some(handle);
                    binding.listener = Some(listener);
                    None
                }
                _ => Some(listener),
            }
        };
        // rebound while subscribing
        if let Some(listener) = stale {
            listener.abort();
            if let Err(err) = self.feed.unsubscribe(handle).await {
                warn!(post_id, error = ?err, "failed to release change subscription");
            }
        }
    }

    async fn on_change(&self, binding: &BindingRef, event: ChangeEvent) {
        if !self.is_current(binding) {
            return;
        }
        debug!(
            post_id = %binding.post_id,
            table = %event.table,
            kind = %event.kind,
            "change received"
        );
        if event.table == POST_LIKES_TABLE_NAME {
            self.reconcile(Reconcile::Refetch).await;
        } else if event.table == POSTS_TABLE_NAME && event.kind == ChangeKind::Update {
            if let Some(likes) = event.row.likes {
                self.reconcile(Reconcile::Count(likes)).await;
            }
        }
    }

    /// The one place remote values reach the state, whichever side triggered it.
    async fn reconcile(&self, source: Reconcile) {
        let Some(binding) = self.current() else {
            return;
        };
        let epoch = self.write_epoch.load(Ordering::SeqCst);
        if self.state.borrow().loading() {
            debug!(post_id = %binding.post_id, "write in flight, reconciliation skipped");
            return;
        }

        let status = match source {
            Reconcile::Count(likes) => (None, likes),
            Reconcile::Refetch => match self.read_status(&binding).await {
                Ok((is_liked, likes)) => (Some(is_liked), likes),
                Err(AppError::Cancelled) => {
                    debug!(post_id = %binding.post_id, "like status fetch cancelled");
                    return;
                }
                Err(err) => {
                    error!(post_id = %binding.post_id, error = ?err, "failed to fetch like status");
                    return;
                }
            },
        };

        self.state.send_if_modified(|state| {
            if state.loading()
                || !self.is_current(&binding)
                || self.write_epoch.load(Ordering::SeqCst) != epoch
            {
                return false;
            }
            match status {
                (Some(is_liked), likes) => state.apply_status(is_liked, likes),
                (None, likes) => state.apply_count(likes),
            }
        });
    }

    async fn read_status(&self, binding: &BindingRef) -> AppResult<(bool, i64)> {
        let post_id = binding.post_id.as_str();
        let user_id = self.auth.current_user_id();
        let deadline = self.config.read_timeout;

        let likes = guarded(
            &binding.token,
            deadline,
            "read post likes",
            self.store.get_post_likes(post_id),
        );
        let is_liked = async {
            match user_id.as_deref() {
                Some(user_id) => {
                    let request = self.store.get_like(post_id, user_id);
                    guarded(&binding.token, deadline, "read like", request)
                        .await
                        .map(|like| like.is_some())
                }
                None => Ok(false),
            }
        };
        let (likes, is_liked) = tokio::join!(likes, is_liked);
        Ok((is_liked?, likes?.unwrap_or(0)))
    }
}

async fn listen(
    inner: Weak<Inner>,
    binding: BindingRef,
    mut events: BoxStream<'static, ChangeEvent>,
) {
    loop {
        let event = tokio::select! {
            _ = binding.token.cancelled() => break,
            event = events.next() => match event {
                Some(event) => event,
                None => break,
            },
        };
        let Some(inner) = inner.upgrade() else {
            break;
        };
        inner.on_change(&binding, event).await;
    }
    debug!(post_id = %binding.post_id, "change listener stopped");
}

/// Races `request` against the binding's cancellation and a deadline.
async fn guarded<T>(
    token: &CancellationToken,
    deadline: Duration,
    operation: &str,
    request: impl Future<Output = AppResult<T>>,
) -> AppResult<T> {
    tokio::select! {
        _ = token.cancelled() => Err(AppError::Cancelled),
        result = tokio::time::timeout(deadline, request) => match result {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout { operation: operation.to_string() }),
        },
    }
}
