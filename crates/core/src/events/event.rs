use std::{any::Any, sync::Arc, time::SystemTime};

use erased_serde::Serialize as ErasedSerialize;
use tokio::time::Instant;
use uuid::Uuid;

pub trait Event: Send + Sync + ErasedSerialize + 'static {
    fn event_id(&self) -> Uuid;
    fn parent_ids(&self) -> &[Uuid];
    fn event_type(&self) -> &'static str;
    fn timestamp(&self) -> SystemTime;

    fn as_any(&self) -> &dyn Any;
}

erased_serde::serialize_trait_object!(Event);

/// Common fields of every event, serialized inline.
#[derive(Clone, Debug, serde::Serialize)]
pub struct EventHeader {
    pub event_id: Uuid,
    pub parent_ids: Vec<Uuid>,
    pub timestamp: SystemTime,
}

impl EventHeader {
    pub fn new() -> Self {
        Self::with_parents(Vec::new())
    }

    pub fn with_parents(parent_ids: Vec<Uuid>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            parent_ids,
            timestamp: SystemTime::now(),
        }
    }
}

impl Default for EventHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// Implement [`Event`] for a struct with a `header: EventHeader` field and an
/// `EVENT_TYPE` constant.
#[macro_export]
macro_rules! header_event {
    ($ty:ty) => {
        impl $crate::events::Event for $ty {
            fn event_id(&self) -> $crate::uuid::Uuid {
                self.header.event_id
            }

            fn parent_ids(&self) -> &[$crate::uuid::Uuid] {
                &self.header.parent_ids
            }

            fn event_type(&self) -> &'static str {
                Self::EVENT_TYPE
            }

            fn timestamp(&self) -> ::std::time::SystemTime {
                self.header.timestamp
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self as &dyn ::std::any::Any
            }
        }
    };
}

pub struct EnrichedEvent {
    pub event: Arc<dyn Event>,
    pub ingest_seq: u64,
    pub session_id: Uuid,
    pub ingested_at: Instant,
}

pub fn downcast_ref<T: 'static>(e: &Arc<dyn Event>) -> Option<&T> {
    e.as_any().downcast_ref::<T>()
}

pub fn expect<'a, T: 'static>(
    e: &'a Arc<dyn Event>,
    expected_event_type: &'static str,
) -> anyhow::Result<&'a T> {
    downcast_ref::<T>(e).ok_or_else(|| {
        anyhow::anyhow!(
            "expected event_type={}, got={}",
            expected_event_type,
            e.event_type()
        )
    })
}
