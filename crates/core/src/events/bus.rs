use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tokio::time::Instant;
use tracing::trace;
use uuid::Uuid;

use crate::{
    events::{BusConfig, BusMetrics, EnrichedEvent, Event},
    routes::Routes,
};

#[derive(Clone)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

struct EventBusInner {
    session_id: Uuid,
    next_ingest_seq: AtomicU64,
    routes: Arc<Routes>,
    metrics: Arc<BusMetrics>,
    strict_routing: bool,
}

impl EventBus {
    pub fn new(cfg: BusConfig, routes: Routes, metrics: Arc<BusMetrics>) -> Self {
        Self {
            inner: Arc::new(EventBusInner {
                session_id: cfg.session_id,
                next_ingest_seq: AtomicU64::new(0),
                routes: Arc::new(routes),
                metrics,
                strict_routing: cfg.strict_routing,
            }),
        }
    }

    /// A bus with no subscribers; every publish is counted as unrouted.
    pub fn detached() -> Self {
        Self::new(
            BusConfig::default(),
            Routes::default(),
            Arc::new(BusMetrics::new()),
        )
    }

    pub fn publish(&self, event: Arc<dyn Event>) {
        let ingest_seq = self.inner.next_ingest_seq.fetch_add(1, Ordering::Relaxed);

        let enriched_event = Arc::new(EnrichedEvent {
            event,
            session_id: self.inner.session_id,
            ingest_seq,
            ingested_at: Instant::now(),
        });

        let event_type = enriched_event.event.event_type();
        let Some(routes) = self.inner.routes.table.get(event_type) else {
            self.inner.metrics.record_unrouted(event_type);

            if self.inner.strict_routing {
                panic!("Unrouted event type: {}", event_type);
            }

            return;
        };

        for route in routes {
            let ok = route.inbox.try_deliver(Arc::clone(&enriched_event));
            trace!(event_type, subscriber = route.subscriber_id, ok, "event delivered");

            if !ok {
                route.drops_total.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.inner.session_id
    }

    pub fn metrics(&self) -> &BusMetrics {
        &self.inner.metrics
    }

    /// Lost deliveries per route, as `(event_type, subscriber_id, count)`.
    /// Routes that never dropped anything are left out.
    pub fn drops(&self) -> Vec<(&'static str, &'static str, u64)> {
        let mut drops: Vec<_> = self
            .inner
            .routes
            .table
            .iter()
            .flat_map(|(event_type, routes)| {
                routes.iter().map(move |route| {
                    (
                        *event_type,
                        route.subscriber_id,
                        route.drops_total.load(Ordering::Relaxed),
                    )
                })
            })
            .filter(|(_, _, count)| *count > 0)
            .collect();
        drops.sort_unstable();
        drops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        events::{EventBusBuilder, EventHeader},
        header_event,
        queues::QueueKind,
        workers::SubscriptionSpec,
    };

    #[derive(serde::Serialize)]
    struct Tick {
        header: EventHeader,
    }

    impl Tick {
        const EVENT_TYPE: &'static str = "test.tick";
    }

    header_event!(Tick);

    #[test]
    fn detached_bus_counts_unrouted_events() {
        let bus = EventBus::detached();
        bus.publish(Arc::new(Tick {
            header: EventHeader::new(),
        }));
        assert_eq!(bus.metrics().unrouted(), 1);
        assert!(bus.drops().is_empty());
    }

    #[test]
    fn overwritten_snapshots_are_reported_as_drops() {
        let (bus, _wiring) = EventBusBuilder::new(BusConfig::default())
            .subscribe(SubscriptionSpec::new("ui.clock").input(Tick::EVENT_TYPE, QueueKind::Latest1))
            .build()
            .unwrap();

        for _ in 0..3 {
            bus.publish(Arc::new(Tick {
                header: EventHeader::new(),
            }));
        }

        assert_eq!(bus.drops(), vec![(Tick::EVENT_TYPE, "ui.clock", 2)]);
        assert_eq!(bus.metrics().unrouted(), 0);
    }
}
