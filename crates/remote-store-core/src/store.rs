//! Local observable value.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, RwLock, RwLockWriteGuard},
};

use crate::{
    Store, StoreError, Unsubscriber,
    listeners::{Listeners, mutex_lock, read_lock, write_lock},
};

/// Shared, observable value that is only ever changed locally.
///
/// Clones share the same value and subscriber list. Subscribers see values
/// in the order they were written, even when writes come from several
/// threads or from inside a subscriber.
pub struct Writable<T> {
    value: Arc<RwLock<T>>,
    subscribers: Arc<Listeners<T>>,
    pending: Arc<Mutex<Pending<T>>>,
}

/// Written values not yet delivered to subscribers.
///
/// At most one caller drains the queue at a time; other writers only
/// enqueue.
struct Pending<T> {
    queue: VecDeque<T>,
    draining: bool,
}

impl<T> Writable<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a store holding `initial`.
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            value: Arc::new(RwLock::new(initial)),
            subscribers: Arc::new(Listeners::new()),
            pending: Arc::new(Mutex::new(Pending {
                queue: VecDeque::new(),
                draining: false,
            })),
        }
    }

    /// Get a clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        read_lock(&self.value).clone()
    }

    /// Read the value without cloning it.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&read_lock(&self.value))
    }

    /// Replace the value and notify subscribers.
    pub fn set(&self, value: T) {
        let mut guard = write_lock(&self.value);
        *guard = value;
        self.publish(guard);
    }

    /// Modify the value in place and notify subscribers.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        let mut guard = write_lock(&self.value);
        f(&mut guard);
        self.publish(guard);
    }

    /// Modify the value in place, notifying subscribers only on success.
    ///
    /// `f` must leave the value untouched when it fails.
    ///
    /// # Errors
    /// Returns whatever `f` returns.
    pub fn try_update<F, E>(&self, f: F) -> Result<(), E>
    where
        F: FnOnce(&mut T) -> Result<(), E>,
    {
        let mut guard = write_lock(&self.value);
        f(&mut guard)?;
        self.publish(guard);
        Ok(())
    }

    /// Subscribe to changes.
    ///
    /// The callback runs once immediately with the current value.
    pub fn subscribe<F>(&self, callback: F) -> Unsubscriber
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let callback: Arc<dyn Fn(&T) + Send + Sync> = Arc::new(callback);
        let handle = self.subscribers.add(Arc::clone(&callback));
        callback(&self.get());
        handle
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Queue the value held by `guard` and deliver everything queued,
    /// unless another caller is already delivering.
    fn publish(&self, guard: RwLockWriteGuard<'_, T>) {
        let mut pending = mutex_lock(&self.pending);
        pending.queue.push_back((*guard).clone());
        drop(guard);
        if pending.draining {
            return;
        }
        pending.draining = true;
        drop(pending);

        let _reset = DrainReset(&self.pending);
        loop {
            let next = {
                let mut pending = mutex_lock(&self.pending);
                match pending.queue.pop_front() {
                    Some(value) => value,
                    None => {
                        pending.draining = false;
                        return;
                    }
                }
            };
            self.subscribers.notify(&next);
        }
    }
}

/// Releases the drain slot if a subscriber panics mid-delivery.
struct DrainReset<'a, T>(&'a Mutex<Pending<T>>);

impl<T> Drop for DrainReset<'_, T> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            let mut pending = mutex_lock(self.0);
            pending.queue.clear();
            pending.draining = false;
        }
    }
}

impl<T> Clone for Writable<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            subscribers: Arc::clone(&self.subscribers),
            pending: Arc::clone(&self.pending),
        }
    }
}

impl<T> Default for Writable<T>
where
    T: Clone + Default + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> std::fmt::Debug for Writable<T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Writable")
            .field("value", &*read_lock(&self.value))
            .finish_non_exhaustive()
    }
}

impl<T> Store<T> for Writable<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn get(&self) -> T {
        Self::get(self)
    }

    fn subscribe<F>(&self, callback: F) -> Unsubscriber
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        Self::subscribe(self, callback)
    }

    fn set(&self, value: T) -> Result<(), StoreError> {
        Self::set(self, value);
        Ok(())
    }

    fn update<F>(&self, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut T),
    {
        Self::update(self, f);
        Ok(())
    }
}
