//! Observable fields.
//!
//! A container wraps every field the view reads in an [Observable]. The binder subscribes
//! to them while the element is attached and marks the element stale on every write.

use std::{
    fmt::Debug,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, PoisonError, RwLock, Weak,
    },
};

/// Callback invoked after an observed value changed
pub type Listener = Arc<dyn Fn() + Send + Sync>;

/// Anything a bound element can watch for changes
pub trait Observe: Send + Sync {
    /// Registers `listener`; it stays registered until the [Subscription] is dropped
    fn subscribe(&self, listener: Listener) -> Subscription;
}

#[derive(Default)]
struct Listeners {
    next_id: AtomicU64,
    entries: Mutex<Vec<(u64, Listener)>>,
}
impl Listeners {
    fn add(self: &Arc<Self>, listener: Listener) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));

        Subscription {
            listeners: Arc::downgrade(self),
            id,
        }
    }

    fn remove(&self, id: u64) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(entry_id, _)| *entry_id != id);
    }

    fn notify(&self) {
        // Snapshot first - listeners may (un)subscribe while being called
        let listeners: Vec<Listener> = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in listeners {
            listener();
        }
    }

    fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Keeps a listener registered - dropping it unsubscribes
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    listeners: Weak<Listeners>,
    id: u64,
}
impl Subscription {
    /// Unsubscribes right away
    pub fn unsubscribe(self) {}
}
impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.remove(self.id);
        }
    }
}
impl Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// A value which notifies its subscribers whenever it is written
pub struct Observable<T> {
    value: RwLock<T>,
    listeners: Arc<Listeners>,
}
impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
impl<T: Debug> Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.with(|value| f.debug_tuple("Observable").field(value).finish())
    }
}

impl<T> Observable<T> {
    pub fn new(value: T) -> Self {
        Observable {
            value: RwLock::new(value),
            listeners: Arc::default(),
        }
    }

    /// Reads the value without cloning it
    pub fn with<R>(&self, read: impl FnOnce(&T) -> R) -> R {
        read(&self.value.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.with(T::clone)
    }

    pub fn set(&self, value: T) {
        self.replace(value);
    }

    /// Writes the value, returning the previous one
    pub fn replace(&self, value: T) -> T {
        let previous = {
            let mut current = self.value.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *current, value)
        };
        self.listeners.notify();
        previous
    }

    /// Modifies the value in place and notifies once afterwards
    pub fn update<R>(&self, modify: impl FnOnce(&mut T) -> R) -> R {
        let result = {
            let mut current = self.value.write().unwrap_or_else(PoisonError::into_inner);
            modify(&mut current)
        };
        self.listeners.notify();
        result
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

impl<T: Send + Sync> Observe for Observable<T> {
    fn subscribe(&self, listener: Listener) -> Subscription {
        self.listeners.add(listener)
    }
}
