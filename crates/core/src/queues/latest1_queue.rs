use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

/// Single-slot mailbox: a new value replaces any unread one.
pub struct Latest1Queue<T> {
    slot: Mutex<Option<T>>,
    notify_any: Arc<Notify>,
}

impl<T> Latest1Queue<T> {
    pub fn new(notify_any: Arc<Notify>) -> Self {
        Self {
            slot: Mutex::new(None),
            notify_any,
        }
    }

    /// Store `value`, returning the unread value it superseded.
    pub fn set(&self, value: T) -> Option<T> {
        let stale = self
            .slot
            .lock()
            .expect("Latest1Queue poisoned")
            .replace(value);
        self.notify_any.notify_one();
        stale
    }

    pub fn try_recv(&self) -> Option<T> {
        self.slot.lock().expect("Latest1Queue poisoned").take()
    }
}
