//! Storefront events
//!
//! Cart changes and drawer requests are broadcast to any number of UI
//! observers. A lagging observer misses old events, never new ones.

use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 64;

/// Notifications published by the cart store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorefrontEvent {
    /// The cart was replaced; carries the new item count.
    CartChanged { count: usize },

    /// The cart drawer should open.
    OpenRequested,

    /// The cart drawer should close.
    CloseRequested,
}

#[derive(Debug, Clone)]
pub(crate) struct EventBus {
    sender: broadcast::Sender<StorefrontEvent>,
}

impl EventBus {
    pub(crate) fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);

        Self { sender }
    }

    pub(crate) fn publish(&self, event: StorefrontEvent) {
        // No observers is not an error.
        _ = self.sender.send(event);
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<StorefrontEvent> {
        self.sender.subscribe()
    }
}
