//! Subscriber inboxes. Each kind trades completeness for bounded memory
//! differently; all of them wake the owning worker through a shared `Notify`.

pub mod fifo_drop_oldest_queue;
pub mod latest1_queue;

pub use fifo_drop_oldest_queue::*;
pub use latest1_queue::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueKind {
    /// Keep only the newest unread event, e.g. playback position.
    Latest1,
    /// Bounded FIFO that evicts the oldest entry when full.
    FifoDropOldest { capacity: usize },
}
