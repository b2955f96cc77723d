//! Named payload channel with synchronous listeners and async streaming.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::{Payload, Unsubscriber, listeners::Listeners};

/// Capacity of the broadcast buffer backing [`Channel::stream`].
const STREAM_CAPACITY: usize = 1024;

/// A named event channel.
///
/// `emit` runs every listener on the caller's stack, in registration order,
/// before returning. Async consumers (transports) observe the same payloads
/// through [`Channel::stream`].
pub struct Channel {
    name: &'static str,
    listeners: Arc<Listeners<Payload>>,
    sender: broadcast::Sender<Payload>,
}

impl Channel {
    /// Create a new channel.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        let (sender, _) = broadcast::channel(STREAM_CAPACITY);
        Self {
            name,
            listeners: Arc::new(Listeners::new()),
            sender,
        }
    }

    /// Channel name, used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Deliver a payload to all listeners and live streams.
    pub fn emit(&self, payload: &Payload) {
        tracing::debug!(channel = self.name, name = payload.name(), "dispatching payload");
        self.listeners.notify(payload);
        let _ = self.sender.send(payload.clone()); // live streams
    }

    /// Parse JSON text and emit it.
    ///
    /// Text that is not a valid payload is dropped with a warning. Returns
    /// whether anything was emitted.
    pub fn emit_json(&self, text: &str) -> bool {
        match Payload::from_json(text) {
            Ok(payload) => {
                self.emit(&payload);
                true
            }
            Err(e) => {
                tracing::warn!(channel = self.name, "Ignoring malformed payload: {e}");
                false
            }
        }
    }

    /// Register a synchronous listener.
    pub fn listen<F>(&self, listener: F) -> Unsubscriber
    where
        F: Fn(&Payload) + Send + Sync + 'static,
    {
        self.listeners.add(Arc::new(listener))
    }

    /// Number of registered synchronous listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Get a receiver for live payloads.
    #[must_use]
    pub fn get_receiver(&self) -> broadcast::Receiver<Payload> {
        self.sender.subscribe()
    }

    /// Stream of payloads emitted after this call.
    #[must_use]
    pub fn stream(&self) -> futures::stream::BoxStream<'static, Payload> {
        let name = self.name;
        BroadcastStream::new(self.get_receiver())
            .filter_map(move |res| async move {
                match res {
                    Ok(payload) => Some(payload),
                    Err(e) => {
                        tracing::warn!(channel = name, "Stream dropped payloads: {e}");
                        None
                    }
                }
            })
            .boxed()
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("name", &self.name)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;

    #[test]
    fn test_emit_reaches_listeners_synchronously() {
        let channel = Channel::new("test");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let _handle = channel.listen(move |p| seen_clone.lock().unwrap().push(p.clone()));

        let payload = Payload::update_property("title", json!("Quiz"));
        channel.emit(&payload);

        assert_eq!(*seen.lock().unwrap(), vec![payload]);
    }

    #[test]
    fn test_emit_json_ignores_garbage() {
        let channel = Channel::new("test");
        let count = Arc::new(Mutex::new(0));
        let count_clone = Arc::clone(&count);
        let _handle = channel.listen(move |_| *count_clone.lock().unwrap() += 1);

        assert!(!channel.emit_json("not json"));
        assert!(!channel.emit_json(r#"{"type":"update_property"}"#));
        assert!(channel.emit_json(
            r#"{"type":"update_property","data":{"name":"title","value":"x"}}"#
        ));
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn test_listener_unsubscribe() {
        let channel = Channel::new("test");
        let handle = channel.listen(|_| {});
        assert_eq!(channel.listener_count(), 1);
        handle.unsubscribe();
        assert_eq!(channel.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_stream_sees_later_payloads() {
        let channel = Channel::new("test");
        channel.emit(&Payload::update_property("title", json!("before")));

        let mut stream = channel.stream();
        channel.emit(&Payload::update_property("title", json!("after")));

        let next = stream.next().await.unwrap();
        assert_eq!(next, Payload::update_property("title", json!("after")));
    }
}
