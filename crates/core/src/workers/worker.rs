use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::warn;

use crate::{
    events::{EnrichedEvent, EventBus},
    workers::{HandlerFailed, SubscriptionSpec, WorkerBatch, WorkerInputs},
};

#[async_trait]
pub trait Worker: Send + Sized + 'static {
    const SUBSCRIBER_ID: &'static str;

    fn subscription() -> SubscriptionSpec;

    async fn handle(&mut self, event: Arc<EnrichedEvent>, bus: &EventBus) -> Result<()>;

    /// Handle events until `shutdown` fires, then drain whatever is queued.
    async fn run(
        mut self,
        mut inputs: WorkerInputs,
        bus: Arc<EventBus>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<()> {
        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                batch = inputs.next() => self.dispatch(batch, &bus).await,
            }
        }

        while let Some(batch) = inputs.try_next() {
            self.dispatch(batch, &bus).await;
        }
        Ok(())
    }

    async fn dispatch(&mut self, batch: WorkerBatch, bus: &EventBus) {
        let events = match batch {
            WorkerBatch::Snapshots(updates) => updates.into_iter().map(|u| u.event).collect(),
            WorkerBatch::FifoItem { event, .. } => vec![event],
        };

        for event in events {
            let parent = Arc::clone(&event.event);
            if let Err(e) = self.handle(event, bus).await {
                warn!(subscriber = Self::SUBSCRIBER_ID, error = %e, "event handler failed");
                bus.publish(Arc::new(HandlerFailed::new(
                    &parent,
                    Self::SUBSCRIBER_ID,
                    format!("{e}"),
                )));
            }
        }
    }
}
