//! Cart change notification
//!
//! Mutations announce on a process-local broadcast. Watchers re-read the
//! store on every announcement and also poll it at a bounded interval,
//! which is how writes made by another process sharing the storage are seen.

use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use super::cart_service::CartStore;
use crate::models::Cart;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartEvent {
    Changed,
}

#[derive(Debug, Clone)]
pub struct CartNotifier {
    sender: broadcast::Sender<CartEvent>,
}

impl CartNotifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(32);
        Self { sender }
    }

    /// Tell every current subscriber the cart changed. No subscribers is fine.
    pub fn announce(&self) {
        let receivers = self.sender.send(CartEvent::Changed).unwrap_or(0);
        tracing::trace!("Cart change announced to {} subscriber(s)", receivers);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.sender.subscribe()
    }
}

impl Default for CartNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// A subscriber's view of the cart. Dropping it unsubscribes.
pub struct CartWatcher {
    store: CartStore,
    events: broadcast::Receiver<CartEvent>,
    events_open: bool,
    poll: Interval,
    last_count: u32,
}

impl CartWatcher {
    /// Must be created inside a Tokio runtime.
    pub fn new(store: CartStore, poll_interval: Duration) -> Self {
        let events = store.notifier().subscribe();
        let last_count = store.load().item_count();
        let mut poll = tokio::time::interval_at(Instant::now() + poll_interval, poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self {
            store,
            events,
            events_open: true,
            poll,
            last_count,
        }
    }

    pub fn last_count(&self) -> u32 {
        self.last_count
    }

    /// Wait for the next observable change and return the freshly loaded cart.
    ///
    /// Announcements always yield; poll ticks yield only when the item count
    /// differs from the last one seen.
    pub async fn next_change(&mut self) -> Cart {
        loop {
            tokio::select! {
                event = self.events.recv(), if self.events_open => {
                    match event {
                        Ok(CartEvent::Changed) | Err(RecvError::Lagged(_)) => {
                            return self.refresh();
                        }
                        Err(RecvError::Closed) => {
                            self.events_open = false;
                        }
                    }
                }
                _ = self.poll.tick() => {
                    let cart = self.store.load();
                    if cart.item_count() != self.last_count {
                        tracing::debug!(
                            "Cart poll detected change: {} -> {}",
                            self.last_count,
                            cart.item_count()
                        );
                        self.last_count = cart.item_count();
                        return cart;
                    }
                }
            }
        }
    }

    fn refresh(&mut self) -> Cart {
        let cart = self.store.load();
        self.last_count = cart.item_count();
        cart
    }
}

/// Keep a badge count current in the background.
///
/// The task ends once every receiver has been dropped and the next change
/// arrives.
pub fn spawn_badge(mut watcher: CartWatcher) -> (watch::Receiver<u32>, JoinHandle<()>) {
    let (sender, receiver) = watch::channel(watcher.last_count());
    let handle = tokio::spawn(async move {
        loop {
            let cart = watcher.next_change().await;
            if sender.send(cart.item_count()).is_err() {
                break;
            }
        }
    });
    (receiver, handle)
}
