//! Inbound/outbound channel pair shared by remote stores.

use std::{
    collections::BTreeSet,
    sync::{Mutex, PoisonError},
};

use crate::{Channel, StoreError};

/// Name of the channel carrying payloads from the collaborator to the stores.
pub const RECV_EVENT: &str = "remotestore_recv";

/// Name of the channel carrying payloads from the stores to the collaborator.
pub const SEND_EVENT: &str = "remotestore_send";

/// Event bus passed to [`crate::create_remote_store`].
///
/// Whatever owns the transport listens on `outbound` and emits echoed
/// updates on `inbound`.
#[derive(Debug)]
pub struct EventBus {
    inbound: Channel,
    outbound: Channel,
    keys: Mutex<BTreeSet<String>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Create a bus with no registered stores.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inbound: Channel::new(RECV_EVENT),
            outbound: Channel::new(SEND_EVENT),
            keys: Mutex::new(BTreeSet::new()),
        }
    }

    /// Channel of updates arriving from the collaborator.
    #[must_use]
    pub const fn inbound(&self) -> &Channel {
        &self.inbound
    }

    /// Channel of writes requested by local stores.
    #[must_use]
    pub const fn outbound(&self) -> &Channel {
        &self.outbound
    }

    /// Claim `key` for a remote store.
    ///
    /// # Errors
    /// Returns `StoreError::DuplicateKey` if the key is already claimed.
    pub fn register_key(&self, key: &str) -> Result<(), StoreError> {
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        if !keys.insert(key.to_owned()) {
            return Err(StoreError::DuplicateKey(key.to_owned()));
        }
        tracing::debug!(key, "registered remote store");
        Ok(())
    }

    /// Keys of all registered remote stores, sorted.
    #[must_use]
    pub fn registered_keys(&self) -> Vec<String> {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_names() {
        let bus = EventBus::new();
        assert_eq!(bus.inbound().name(), "remotestore_recv");
        assert_eq!(bus.outbound().name(), "remotestore_send");
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let bus = EventBus::new();
        bus.register_key("title").unwrap();
        bus.register_key("answers").unwrap();

        let err = bus.register_key("title").unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(ref k) if k == "title"));
        assert_eq!(bus.registered_keys(), vec!["answers", "title"]);
    }
}
