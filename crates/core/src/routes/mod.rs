use std::{
    collections::HashMap,
    sync::{Arc, atomic::AtomicU64},
};

use crate::{
    events::EnrichedEvent,
    queues::{FifoDropOldestQueue, Latest1Queue},
};

/// Event type -> subscriber inboxes.
#[derive(Default)]
pub struct Routes {
    pub table: HashMap<&'static str, Vec<Route>>,
}

pub struct Route {
    pub subscriber_id: &'static str,
    pub inbox: RouteInbox,
    /// Events this subscriber never saw: overwritten or evicted.
    pub drops_total: Arc<AtomicU64>,
}

pub enum RouteInbox {
    Latest1(Arc<Latest1Queue<Arc<EnrichedEvent>>>),
    FifoDropOldest(Arc<FifoDropOldestQueue<Arc<EnrichedEvent>>>),
}

impl RouteInbox {
    /// Deliver `event`; false when this or an earlier event was lost doing so.
    pub fn try_deliver(&self, event: Arc<EnrichedEvent>) -> bool {
        match self {
            RouteInbox::Latest1(q) => q.set(event).is_none(),
            RouteInbox::FifoDropOldest(q) => q.push_overwrite(event).is_none(),
        }
    }
}
