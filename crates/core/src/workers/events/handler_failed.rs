use std::sync::Arc;

use serde::Serialize;

use crate::{
    events::{Event, EventHeader},
    header_event,
};

/// A worker's handler returned an error for the parent event.
#[derive(Clone, Debug, Serialize)]
pub struct HandlerFailed {
    #[serde(flatten)]
    pub header: EventHeader,
    pub stage: &'static str,
    pub message: String,
}

impl HandlerFailed {
    pub const EVENT_TYPE: &'static str = "worker.handler_failed";

    pub fn new(parent: &Arc<dyn Event>, subscriber_id: &'static str, message: String) -> Self {
        Self {
            header: EventHeader::with_parents(vec![parent.event_id()]),
            stage: subscriber_id,
            message,
        }
    }
}

header_event!(HandlerFailed);
