use std::sync::Arc;

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::interfaces::change_feed::SubscriptionHandle;

/// Live change subscriptions of one feed, keyed by handle.
/// Releasing a handle cancels its token, which ends the subscriber's stream.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionRegistry {
    tokens: Arc<DashMap<SubscriptionHandle, CancellationToken>>,
}

impl SubscriptionRegistry {
    pub fn register(&self) -> (SubscriptionHandle, CancellationToken) {
        let handle = Uuid::new_v4();
        let token = CancellationToken::new();
        self.tokens.insert(handle, token.clone());
        (handle, token)
    }

    pub fn release(&self, handle: &SubscriptionHandle) -> bool {
        match self.tokens.remove(handle) {
            Some((_, token)) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
