//! Stores whose writes round-trip through the event bus.

use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};

use crate::{EventBus, Payload, Store, StoreError, Unsubscriber, Writable};

/// Observable value mirrored from a remote collaborator.
///
/// Reads and subscriptions see the last value that arrived on the bus's
/// inbound channel for this key. `set` only emits a request on the outbound
/// channel; the local value changes once the collaborator echoes it back.
pub struct RemoteStore<T> {
    key: Arc<str>,
    local: Writable<T>,
    bus: Arc<EventBus>,
}

/// Create a remote store for `key` on `bus`.
///
/// Starts at `default`, or `T::default()` when none is given.
///
/// # Errors
/// Returns `StoreError::DuplicateKey` if `bus` already has a store for `key`.
pub fn create_remote_store<T>(
    bus: &Arc<EventBus>,
    key: impl Into<String>,
    default: Option<T>,
) -> Result<RemoteStore<T>, StoreError>
where
    T: Serialize + DeserializeOwned + Clone + Default + Send + Sync + 'static,
{
    let key: Arc<str> = Arc::from(key.into());
    bus.register_key(&key)?;

    let local = Writable::new(default.unwrap_or_default());

    // Lives as long as the bus.
    let _ = bus.inbound().listen({
        let key = Arc::clone(&key);
        let local = local.clone();
        move |payload: &Payload| match payload {
            Payload::UpdateProperty(update) if *update.name == *key => {
                match serde_json::from_value::<T>(update.value.clone()) {
                    Ok(value) => local.set(value),
                    Err(e) => tracing::warn!(key = &*key, "Ignoring undecodable value: {e}"),
                }
            }
            Payload::UpdateProperty(_) => {}
        }
    });

    Ok(RemoteStore {
        key,
        local,
        bus: Arc::clone(bus),
    })
}

impl<T> RemoteStore<T>
where
    T: Serialize + Clone + Send + Sync + 'static,
{
    /// Key this store is registered under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Last value received from the collaborator.
    #[must_use]
    pub fn get(&self) -> T {
        self.local.get()
    }

    /// Subscribe to received values.
    pub fn subscribe<F>(&self, callback: F) -> Unsubscriber
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.local.subscribe(callback)
    }

    /// Ask the collaborator to set a new value.
    ///
    /// # Errors
    /// Returns `StoreError::Encode` if the value cannot be serialized.
    pub fn set(&self, value: T) -> Result<(), StoreError> {
        let payload = Payload::update_property(&*self.key, serde_json::to_value(&value)?);
        self.bus.outbound().emit(&payload);
        Ok(())
    }

    /// Always fails: a new value cannot be derived without the collaborator.
    ///
    /// # Errors
    /// Returns `StoreError::Unsupported`.
    pub fn update<F>(&self, _f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut T),
    {
        Err(StoreError::Unsupported {
            key: self.key.to_string(),
            operation: "update",
        })
    }
}

impl<T> Clone for RemoteStore<T> {
    fn clone(&self) -> Self {
        Self {
            key: Arc::clone(&self.key),
            local: self.local.clone(),
            bus: Arc::clone(&self.bus),
        }
    }
}

impl<T> std::fmt::Debug for RemoteStore<T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteStore")
            .field("key", &self.key)
            .field("local", &self.local)
            .finish_non_exhaustive()
    }
}

impl<T> Store<T> for RemoteStore<T>
where
    T: Serialize + Clone + Send + Sync + 'static,
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
        Self::set(self, value)
    }

    fn update<F>(&self, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut T),
    {
        Self::update(self, f)
    }
}
