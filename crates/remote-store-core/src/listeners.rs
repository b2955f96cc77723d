//! Callback lists shared by channels and stores.

use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak,
    atomic::{AtomicU64, Ordering},
};

pub(crate) type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Ordered list of callbacks.
///
/// Notification works on a snapshot of the list, so callbacks may register,
/// unregister or trigger further notifications without deadlocking.
pub(crate) struct Listeners<T> {
    entries: RwLock<Vec<(u64, Callback<T>)>>,
    next_id: AtomicU64,
}

impl<T: 'static> Listeners<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    pub(crate) fn add(self: &Arc<Self>, callback: Callback<T>) -> Unsubscriber {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        write_lock(&self.entries).push((id, callback));

        let weak: Weak<Self> = Arc::downgrade(self);
        Unsubscriber::new(move || {
            if let Some(listeners) = weak.upgrade() {
                listeners.remove(id);
            }
        })
    }

    fn remove(&self, id: u64) {
        write_lock(&self.entries).retain(|(entry_id, _)| *entry_id != id);
    }

    pub(crate) fn notify(&self, value: &T) {
        let snapshot: Vec<Callback<T>> = read_lock(&self.entries)
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in snapshot {
            callback(value);
        }
    }

    pub(crate) fn len(&self) -> usize {
        read_lock(&self.entries).len()
    }
}

/// Handle returned by `subscribe`/`listen`.
///
/// Dropping the handle leaves the callback registered; call
/// [`Unsubscriber::unsubscribe`] to remove it.
pub struct Unsubscriber {
    remove: Box<dyn FnOnce() + Send + Sync>,
}

impl Unsubscriber {
    fn new(remove: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            remove: Box::new(remove),
        }
    }

    /// Stop receiving notifications.
    pub fn unsubscribe(self) {
        (self.remove)();
    }
}

impl std::fmt::Debug for Unsubscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unsubscriber").finish_non_exhaustive()
    }
}

pub(crate) fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn mutex_lock<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}
