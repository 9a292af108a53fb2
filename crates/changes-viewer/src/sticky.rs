//! Sticky header tracking driven by scroll notifications.
//!
//! The host owns a [`ScrollEmitter`] and publishes scroll offsets on it.
//! A mounted [`ChangesSession`](crate::ChangesSession) subscribes and feeds
//! the offsets to its controller; the returned [`ScrollSubscription`]
//! unregisters itself when dropped.

use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// Scroll offset at which the header counts as stuck.
pub const STICKY_HEADER_HEIGHT: u32 = 150;

/// Offset from the viewport top at which per-file headers pin.
pub const STICKY_TOP_POSITION: u32 = 64;

type Listener = Arc<dyn Fn(u32) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Broadcasts scroll offsets to subscribed listeners.
#[derive(Clone, Default)]
pub struct ScrollEmitter {
    registry: Arc<Mutex<Registry>>,
}

impl ScrollEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It stays registered until the guard is dropped.
    pub fn subscribe(&self, listener: impl Fn(u32) + Send + Sync + 'static) -> ScrollSubscription {
        let mut registry = self.registry.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Arc::new(listener)));
        log::trace!("Scroll listener {} registered", id);

        ScrollSubscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Deliver a scroll offset to every listener.
    pub fn emit(&self, offset: u32) {
        // Listeners run outside the lock so they may subscribe or drop guards.
        let listeners: Vec<Listener> = self
            .registry
            .lock()
            .listeners
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener(offset);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.registry.lock().listeners.len()
    }
}

impl std::fmt::Debug for ScrollEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollEmitter")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Guard for one registered scroll listener.
#[derive(Debug)]
pub struct ScrollSubscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Drop for ScrollSubscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().listeners.retain(|(id, _)| *id != self.id);
            log::trace!("Scroll listener {} released", self.id);
        }
    }
}

/// Derives the "header is stuck" flag from scroll offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollStickiness {
    threshold: u32,
    stuck: bool,
}

impl Default for ScrollStickiness {
    fn default() -> Self {
        Self::new(STICKY_HEADER_HEIGHT)
    }
}

impl ScrollStickiness {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            stuck: false,
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Recompute from a scroll offset and return the new flag.
    pub fn on_scroll(&mut self, offset: u32) -> bool {
        self.stuck = offset >= self.threshold;
        self.stuck
    }

    pub fn is_stuck(&self) -> bool {
        self.stuck
    }
}
