//! Store trait and errors.

use thiserror::Error;

use crate::Unsubscriber;

/// Store error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unsupported operation `{operation}` on remote store `{key}`")]
    Unsupported {
        key: String,
        operation: &'static str,
    },
    #[error("A remote store is already registered for key `{0}`")]
    DuplicateKey(String),
    #[error("Failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Observable value holder.
///
/// `subscribe` calls the callback with the current value right away and
/// again after every change.
pub trait Store<T> {
    /// Clone of the current value.
    fn get(&self) -> T;

    /// Register a change callback.
    fn subscribe<F>(&self, callback: F) -> Unsubscriber
    where
        F: Fn(&T) + Send + Sync + 'static;

    /// Request a new value.
    ///
    /// # Errors
    /// Returns error if the value cannot be delivered.
    fn set(&self, value: T) -> Result<(), StoreError>;

    /// Modify the current value in place.
    ///
    /// # Errors
    /// Returns error if the store does not support local modification.
    fn update<F>(&self, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut T);
}
