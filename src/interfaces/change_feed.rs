use crate::entities::change_event::{ChangeEvent, ChangeFilter};
use crate::error::AppResult;
use async_trait::async_trait;
use futures::stream::BoxStream;
use uuid::Uuid;

pub type SubscriptionHandle = Uuid;

pub struct ChangeSubscription {
    pub handle: SubscriptionHandle,
    /// Ends once the subscription is released.
    pub events: BoxStream<'static, ChangeEvent>,
}

#[async_trait]
pub trait ChangeFeedInterface {
    /// Delivers every change matching at least one of `filters`.
    async fn subscribe(
        &self,
        topic: &str,
        filters: Vec<ChangeFilter>,
    ) -> AppResult<ChangeSubscription>;
    /// Unknown or already released handles are ignored.
    async fn unsubscribe(&self, handle: SubscriptionHandle) -> AppResult<()>;
}
