//! Listener registration with explicit subscription objects
//!
//! [`Listeners::subscribe`] returns a [`Subscription`]. Dropping it (or
//! calling [`Subscription::unsubscribe`]) removes the callback before the
//! drop returns, so no event is delivered afterwards.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

type Callback<E> = Box<dyn FnMut(&E) + Send>;

struct Table<E> {
    next_id: u64,
    callbacks: Vec<(u64, Callback<E>)>,
}

/// A set of callbacks for events of type `E`.
///
/// Callbacks run while the table is locked: they must not subscribe or
/// drop a subscription of the same table.
pub struct Listeners<E> {
    table: Arc<Mutex<Table<E>>>,
}

impl<E: 'static> Listeners<E> {
    pub fn new() -> Self {
        Self {
            table: Arc::new(Mutex::new(Table {
                next_id: 1,
                callbacks: Vec::new(),
            })),
        }
    }

    /// Register a callback
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(&E) + Send + 'static,
    {
        let id = {
            let mut table = self.table.lock();
            let id = table.next_id;
            table.next_id += 1;
            table.callbacks.push((id, Box::new(callback)));
            id
        };

        let weak: Weak<Mutex<Table<E>>> = Arc::downgrade(&self.table);
        Subscription {
            id,
            unsubscribe: Some(Box::new(move || {
                if let Some(table) = weak.upgrade() {
                    table.lock().callbacks.retain(|(entry, _)| *entry != id);
                }
            })),
        }
    }

    /// Deliver an event to every callback, in subscription order
    pub fn emit(&self, event: &E) {
        let mut table = self.table.lock();
        for (_, callback) in table.callbacks.iter_mut() {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.table.lock().callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: 'static> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.table.lock().callbacks.len())
            .finish()
    }
}

/// Keeps a callback registered for as long as it lives
#[must_use = "dropping a Subscription unregisters its callback"]
pub struct Subscription {
    id: u64,
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Unregister now
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
