use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use surrealdb::{Action, Notification};
use tracing::{debug, warn};

use crate::database::client::Db;
use crate::database::surrdb_utils::{check_ident, eq_condition};
use crate::entities::change_event::{ChangeEvent, ChangeFilter, ChangeKind, RowImage};
use crate::error::AppResult;
use crate::interfaces::change_feed::{ChangeFeedInterface, ChangeSubscription, SubscriptionHandle};
use crate::utils::subscription_registry::SubscriptionRegistry;

/// Change feed backed by SurrealDB `LIVE SELECT` queries, one per filter.
/// Dropping a live stream kills the query on the server.
#[derive(Debug)]
pub struct SurrealChangeFeed {
    client: Arc<Db>,
    registry: SubscriptionRegistry,
}

impl SurrealChangeFeed {
    pub fn new(client: Arc<Db>) -> Self {
        Self {
            client,
            registry: SubscriptionRegistry::default(),
        }
    }

    pub fn active_subscriptions(&self) -> usize {
        self.registry.len()
    }

    async fn live_select(
        &self,
        filter: ChangeFilter,
    ) -> AppResult<BoxStream<'static, ChangeEvent>> {
        let table = check_ident(&filter.table)?;
        let condition = eq_condition(table, &filter.predicate.column, &filter.predicate.value)?;
        let mut res = self
            .client
            .query(format!("LIVE SELECT * FROM {table} WHERE {condition};"))
            .await?;
        let notifications = res.stream::<Notification<RowImage>>(0)?;

        let events = notifications.filter_map(move |item| {
            let filter = filter.clone();
            async move {
                let notification = match item {
                    Ok(notification) => notification,
                    Err(err) => {
                        warn!(
                            table = %filter.table,
                            error = %err,
                            "live query notification failed"
                        );
                        return None;
                    }
                };
                let kind = match notification.action {
                    Action::Create => ChangeKind::Insert,
                    Action::Update => ChangeKind::Update,
                    Action::Delete => ChangeKind::Delete,
                    _ => return None,
                };
                if !filter.event.matches(kind) {
                    return None;
                }
                let mut row = notification.data;
                if filter.predicate.column == "id" {
                    row.id = Some(filter.predicate.value.clone());
                }
                Some(ChangeEvent {
                    table: filter.table.clone(),
                    kind,
                    row,
                })
            }
        });
        Ok(events.boxed())
    }
}

#[async_trait]
impl ChangeFeedInterface for SurrealChangeFeed {
    async fn subscribe(
        &self,
        topic: &str,
        filters: Vec<ChangeFilter>,
    ) -> AppResult<ChangeSubscription> {
        let (handle, token) = self.registry.register();
        let mut streams = Vec::with_capacity(filters.len());
        for filter in filters {
            match self.live_select(filter).await {
                Ok(events) => streams.push(events),
                Err(err) => {
                    self.registry.release(&handle);
                    return Err(err);
                }
            }
        }
        debug!(%topic, %handle, live_queries = streams.len(), "subscribed");

        let events = stream::select_all(streams)
            .take_until(token.cancelled_owned())
            .boxed();
        Ok(ChangeSubscription { handle, events })
    }

    async fn unsubscribe(&self, handle: SubscriptionHandle) -> AppResult<()> {
        if self.registry.release(&handle) {
            debug!(%handle, "unsubscribed");
        }
        Ok(())
    }
}
