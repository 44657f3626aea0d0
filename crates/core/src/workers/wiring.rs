use std::collections::HashMap;

use crate::{queues::QueueKind, workers::WorkerInputs};

pub struct SubscriptionSpec {
    pub subscriber_id: &'static str,
    pub inputs: Vec<InputSpec>,
}

pub struct InputSpec {
    pub event_type: &'static str,
    pub queue_kind: QueueKind,
}

impl SubscriptionSpec {
    pub fn new(subscriber_id: &'static str) -> Self {
        Self {
            subscriber_id,
            inputs: Vec::new(),
        }
    }

    pub fn input(mut self, event_type: &'static str, queue_kind: QueueKind) -> Self {
        self.inputs.push(InputSpec {
            event_type,
            queue_kind,
        });
        self
    }
}

/// Inputs built by the bus, waiting to be claimed by their worker.
pub struct WorkerWiring {
    inputs: HashMap<&'static str, WorkerInputs>,
}

impl WorkerWiring {
    pub fn new(inputs: HashMap<&'static str, WorkerInputs>) -> Self {
        Self { inputs }
    }

    pub fn take(&mut self, subscriber_id: &'static str) -> Option<WorkerInputs> {
        self.inputs.remove(subscriber_id)
    }
}
