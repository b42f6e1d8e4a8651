use async_trait::async_trait;
use futures::future;
use futures::StreamExt;
use tokio::sync::broadcast::{self, Sender};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

use crate::entities::change_event::{ChangeEvent, ChangeFilter};
use crate::error::AppResult;
use crate::interfaces::change_feed::{ChangeFeedInterface, ChangeSubscription, SubscriptionHandle};
use crate::utils::subscription_registry::SubscriptionRegistry;

/// In-process change feed. Whoever writes to the store publishes the change here.
#[derive(Debug, Clone)]
pub struct BroadcastChangeFeed {
    event_sender: Sender<ChangeEvent>,
    registry: SubscriptionRegistry,
}

impl BroadcastChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (event_sender, _) = broadcast::channel(capacity.max(1));
        Self {
            event_sender,
            registry: SubscriptionRegistry::default(),
        }
    }

    /// Returns how many subscribers saw the event.
    pub fn publish(&self, event: ChangeEvent) -> usize {
        self.event_sender.send(event).unwrap_or(0)
    }

    pub fn active_subscriptions(&self) -> usize {
        self.registry.len()
    }
}

#[async_trait]
impl ChangeFeedInterface for BroadcastChangeFeed {
    async fn subscribe(
        &self,
        topic: &str,
        filters: Vec<ChangeFilter>,
    ) -> AppResult<ChangeSubscription> {
        let (handle, token) = self.registry.register();
        let rx = self.event_sender.subscribe();
        let topic_name = topic.to_string();
        let events = BroadcastStream::new(rx)
            .filter_map(move |msg| {
                let event = match msg {
                    Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                        warn!(topic = %topic_name, skipped, "change subscriber lagged");
                        None
                    }
                    Ok(event) if filters.iter().any(|filter| filter.matches(&event)) => {
                        Some(event)
                    }
                    Ok(_) => None,
                };
                future::ready(event)
            })
            .take_until(token.cancelled_owned())
            .boxed();
        debug!(%topic, %handle, "subscribed");
        Ok(ChangeSubscription { handle, events })
    }

    async fn unsubscribe(&self, handle: SubscriptionHandle) -> AppResult<()> {
        if self.registry.release(&handle) {
            debug!(%handle, "unsubscribed");
        }
        Ok(())
    }
}
