//! Typed publish/subscribe shared by every stateful component.
//!
//! An event type is usually an enum whose variants carry the payload; its
//! [`Event::Kind`] is the matching field-less enum that subscribers filter
//! on. Handlers run synchronously, in subscription order, on the thread that
//! publishes.
//!
//! ```
//! use slide_embed::events::{Event, EventBus};
//!
//! #[derive(Debug)]
//! enum Tick { Fired(u32) }
//!
//! impl Event for Tick {
//!     type Kind = ();
//!     fn kind(&self) -> Self::Kind {}
//! }
//!
//! let mut bus = EventBus::new();
//! let sub = bus.subscribe((), |event: &Tick| println!("{event:?}"));
//! assert_eq!(bus.publish(&Tick::Fired(1)), 1);
//! assert!(bus.unsubscribe(sub));
//! assert_eq!(bus.publish(&Tick::Fired(2)), 0);
//! ```

use std::fmt;
use std::hash::Hash;

/// An event payload that knows which named kind it belongs to.
pub trait Event {
    type Kind: Copy + Eq + Hash + fmt::Debug;

    fn kind(&self) -> Self::Kind;
}

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Handler<E> = Box<dyn FnMut(&E)>;

struct Entry<E: Event> {
    id: u64,
    kind: E::Kind,
    handler: Handler<E>,
}

/// Subscriber registry for one event type.
pub struct EventBus<E: Event> {
    next_id: u64,
    entries: Vec<Entry<E>>,
}

impl<E: Event> EventBus<E> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    /// Register `handler` for events of `kind`.
    pub fn subscribe<F>(&mut self, kind: E::Kind, handler: F) -> Subscription
    where
        F: FnMut(&E) + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            kind,
            handler: Box::new(handler),
        });
        Subscription(id)
    }

    /// Remove a handler. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != subscription.0);
        self.entries.len() != before
    }

    /// Deliver `event` to every handler subscribed to its kind.
    ///
    /// Returns the number of handlers invoked.
    pub fn publish(&mut self, event: &E) -> usize {
        let kind = event.kind();
        let mut delivered = 0;
        for entry in self.entries.iter_mut().filter(|e| e.kind == kind) {
            (entry.handler)(event);
            delivered += 1;
        }
        delivered
    }

    /// Drop every handler.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.entries.len()
    }
}

impl<E: Event> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<E::Kind> = self.entries.iter().map(|e| e.kind).collect();
        f.debug_struct("EventBus").field("subscribers", &kinds).finish()
    }
}
