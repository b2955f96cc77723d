//! The set of stores the quiz front-end reads and writes.

use std::sync::Arc;

use remote_store_core::{EventBus, RemoteStore, StoreError, Writable, create_remote_store};

use crate::{Answer, ConnectionStatus};

/// Key of the question title store.
pub const TITLE_KEY: &str = "title";

/// Key of the answer list store.
pub const ANSWERS_KEY: &str = "answers";

/// All stores of one front-end session.
///
/// `title` and `answers` are mirrored from the collaborator through the bus;
/// `is_gamemaster` and `connection_status` never leave this process.
#[derive(Clone)]
pub struct Stores {
    pub title: RemoteStore<String>,
    pub answers: RemoteStore<Vec<Answer>>,
    pub is_gamemaster: Writable<bool>,
    pub connection_status: Writable<ConnectionStatus>,
}

impl Stores {
    /// Register the remote stores on `bus` and create the local ones.
    ///
    /// # Errors
    /// Returns `StoreError::DuplicateKey` if `bus` already carries a store
    /// named `title` or `answers`.
    pub fn new(bus: &Arc<EventBus>) -> Result<Self, StoreError> {
        Ok(Self {
            title: create_remote_store(bus, TITLE_KEY, None)?,
            answers: create_remote_store(bus, ANSWERS_KEY, Some(Vec::new()))?,
            is_gamemaster: Writable::new(false),
            connection_status: Writable::new(ConnectionStatus::Disconnected),
        })
    }

    /// Record a change of the collaborator link.
    pub fn set_connection_status(&self, status: ConnectionStatus) {
        if self.connection_status.get() != status {
            tracing::info!(?status, "connection status changed");
        }
        self.connection_status.set(status);
    }

    /// Number of answers currently revealed.
    #[must_use]
    pub fn shown_count(&self) -> usize {
        self.answers.get().iter().filter(|a| a.shown).count()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use remote_store_core::Payload;
    use serde_json::json;
    use tokio_test::assert_ok;

    use super::*;

    #[test]
    fn test_initial_values() {
        let bus = Arc::new(EventBus::new());
        let stores = Stores::new(&bus).unwrap();

        assert_eq!(stores.title.get(), "");
        assert!(stores.answers.get().is_empty());
        assert!(!stores.is_gamemaster.get());
        assert_eq!(stores.connection_status.get(), ConnectionStatus::Disconnected);
        assert_eq!(bus.registered_keys(), vec!["answers", "title"]);
    }

    #[test]
    fn test_second_registry_on_same_bus_fails() {
        let bus = Arc::new(EventBus::new());
        let _stores = Stores::new(&bus).unwrap();
        assert!(matches!(Stores::new(&bus), Err(StoreError::DuplicateKey(_))));
    }

    #[test]
    fn test_answers_follow_inbound_updates() {
        let bus = Arc::new(EventBus::new());
        let stores = Stores::new(&bus).unwrap();

        bus.inbound().emit(&Payload::update_property(
            ANSWERS_KEY,
            json!([
                {"id": 1, "text": "Cat", "votes": 60, "shown": true},
                {"id": 2, "text": "Dog", "votes": 40, "shown": false}
            ]),
        ));

        let answers = stores.answers.get();
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[0].text, "Cat");
        assert_eq!(stores.shown_count(), 1);
        assert_eq!(stores.title.get(), "");
    }

    #[test]
    fn test_local_stores_stay_off_the_bus() {
        let bus = Arc::new(EventBus::new());
        let stores = Stores::new(&bus).unwrap();
        let sent = Arc::new(Mutex::new(0));
        let sent_clone = Arc::clone(&sent);
        let _h = bus
            .outbound()
            .listen(move |_| *sent_clone.lock().unwrap() += 1);

        stores.is_gamemaster.set(true);
        stores.set_connection_status(ConnectionStatus::Connected);
        assert_eq!(*sent.lock().unwrap(), 0);
        assert!(stores.connection_status.get().is_connected());

        assert_ok!(stores.title.set("Quiz".to_string()));
        assert_eq!(*sent.lock().unwrap(), 1);
    }
}
