use std::sync::Arc;

use tokio::sync::Notify;

use crate::{
    events::EnrichedEvent,
    queues::{FifoDropOldestReceiver, Latest1Queue},
};

pub struct Latest1Input {
    pub event_type: &'static str,
    pub queue: Arc<Latest1Queue<Arc<EnrichedEvent>>>,
}

pub enum FifoReceiver {
    FifoDropOldest(FifoDropOldestReceiver<Arc<EnrichedEvent>>),
}

pub struct FifoInput {
    pub event_type: &'static str,
    pub receiver: FifoReceiver,
}

pub struct WorkerInputs {
    pub latest: Vec<Latest1Input>,
    pub fifos: Vec<FifoInput>,
    pub notify_any: Arc<Notify>,
    pub fifo_index: usize,
}

pub enum WorkerBatch {
    Snapshots(Vec<SnapshotUpdate>),
    FifoItem {
        event_type: &'static str,
        event: Arc<EnrichedEvent>,
    },
}

pub struct SnapshotUpdate {
    pub event_type: &'static str,
    pub event: Arc<EnrichedEvent>,
}

impl WorkerInputs {
    /// Wait for the next batch. Snapshots take priority over FIFO items, and
    /// FIFO inputs are visited round-robin.
    pub async fn next(&mut self) -> WorkerBatch {
        loop {
            if let Some(batch) = self.try_next() {
                return batch;
            }
            self.notify_any.notified().await;
        }
    }

    pub fn try_next(&mut self) -> Option<WorkerBatch> {
        let snaps: Vec<SnapshotUpdate> = self
            .latest
            .iter()
            .filter_map(|l| {
                l.queue.try_recv().map(|event| SnapshotUpdate {
                    event_type: l.event_type,
                    event,
                })
            })
            .collect();

        if !snaps.is_empty() {
            return Some(WorkerBatch::Snapshots(snaps));
        }

        for _ in 0..self.fifos.len() {
            let i = self.fifo_index;
            self.fifo_index = (self.fifo_index + 1) % self.fifos.len();
            let fifo = &mut self.fifos[i];

            let item = match fifo.receiver {
                FifoReceiver::FifoDropOldest(ref mut r) => r.try_recv(),
            };

            if let Some(event) = item {
                return Some(WorkerBatch::FifoItem {
                    event_type: fifo.event_type,
                    event,
                });
            }
        }

        None
    }
}
