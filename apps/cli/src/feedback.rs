use std::sync::Arc;

use anyhow::Context;
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::debug;
use wordjump_core::{
    events::{BusConfig, EventBus, EventBusBuilder},
    workers::Worker,
};

use crate::workers::feedback_sink::{FeedbackSinkWorker, OutputMode};

pub struct FeedbackHandle {
    pub bus: EventBus,
    shutdown_tx: broadcast::Sender<()>,
    sink: JoinHandle<anyhow::Result<()>>,
}

impl FeedbackHandle {
    /// Stop the sink after it has rendered everything already published.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        // the sink may already be gone if it failed
        let _ = self.shutdown_tx.send(());
        let result = self.sink.await.context("feedback sink panicked")?;

        for (event_type, subscriber, count) in self.bus.drops() {
            debug!(event_type, subscriber, count, "events dropped before rendering");
        }
        result
    }
}

pub fn start_feedback(mode: OutputMode) -> anyhow::Result<FeedbackHandle> {
    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);

    let (bus, mut wiring) = EventBusBuilder::new(BusConfig::default())
        .subscribe(FeedbackSinkWorker::subscription())
        .build()?;

    let inputs = wiring
        .take(FeedbackSinkWorker::SUBSCRIBER_ID)
        .context("feedback sink was not wired")?;
    let sink = tokio::spawn(FeedbackSinkWorker::new(mode).run(
        inputs,
        Arc::new(bus.clone()),
        shutdown_rx,
    ));
    debug!(session_id = %bus.session_id(), "feedback sink started");

    Ok(FeedbackHandle {
        bus,
        shutdown_tx,
        sink,
    })
}
