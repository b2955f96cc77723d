//! Applies client updates to the game state and publishes every change.

use std::sync::{Arc, Weak};

use futures::StreamExt;
use remote_store_core::{Channel, EventBus, Payload, Writable};
use remote_store_stores::{ANSWERS_KEY, TITLE_KEY};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

use crate::{
    GameState,
    answers::{AnswerError, AnswerTarget, Visibility, apply_visibility},
};

/// Name of the channel carrying state changes to clients.
pub const CHANGES_CHANNEL: &str = "authority_changes";

/// Error applying a client payload.
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("No property named `{0}`")]
    UnknownProperty(String),
    #[error("Invalid value for `{name}`: {source}")]
    InvalidValue {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A state value addressable by name with JSON values.
trait Property: Send + Sync {
    fn set_json(&self, value: Value) -> Result<(), serde_json::Error>;

    fn get_json(&self) -> Result<Value, serde_json::Error>;
}

impl<T> Property for Writable<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    fn set_json(&self, value: Value) -> Result<(), serde_json::Error> {
        self.set(serde_json::from_value::<T>(value)?);
        Ok(())
    }

    fn get_json(&self) -> Result<Value, serde_json::Error> {
        self.read(|value| serde_json::to_value(value))
    }
}

/// Owner of the authoritative state.
pub struct Authority {
    state: GameState,
    properties: Vec<(&'static str, Box<dyn Property>)>,
    changes: Arc<Channel>,
}

impl Authority {
    /// Take ownership of `state` and start publishing its changes.
    #[must_use]
    pub fn new(state: GameState) -> Self {
        let changes = Arc::new(Channel::new(CHANGES_CHANNEL));

        observe(TITLE_KEY, &state.title, &changes);
        observe(ANSWERS_KEY, &state.answers, &changes);

        let properties: Vec<(&'static str, Box<dyn Property>)> = vec![
            (TITLE_KEY, Box::new(state.title.clone()) as Box<dyn Property>),
            (ANSWERS_KEY, Box::new(state.answers.clone())),
        ];

        Self {
            state,
            properties,
            changes,
        }
    }

    /// The state being served.
    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Channel on which every state change is published.
    #[must_use]
    pub fn changes(&self) -> &Channel {
        &self.changes
    }

    /// Apply a client payload.
    ///
    /// # Errors
    /// Returns error if the property is unknown or the value does not fit it.
    pub fn apply(&self, payload: &Payload) -> Result<(), ApplyError> {
        match payload {
            Payload::UpdateProperty(update) => {
                let property = self
                    .property(&update.name)
                    .ok_or_else(|| ApplyError::UnknownProperty(update.name.clone()))?;

                tracing::debug!(name = %update.name, value = %update.value, "received update");
                property
                    .set_json(update.value.clone())
                    .map_err(|source| ApplyError::InvalidValue {
                        name: update.name.clone(),
                        source,
                    })
            }
        }
    }

    /// Current value of every property, one payload each.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Payload> {
        self.properties
            .iter()
            .filter_map(|(name, property)| match property.get_json() {
                Ok(value) => Some(Payload::update_property(*name, value)),
                Err(e) => {
                    tracing::error!(name, "Failed to encode property: {e}");
                    None
                }
            })
            .collect()
    }

    /// Stream that yields the snapshot first, then live changes.
    #[must_use]
    pub fn snapshot_plus_stream(&self) -> futures::stream::BoxStream<'static, Payload> {
        let live = self.changes.stream();
        let snapshot = futures::stream::iter(self.snapshot());
        snapshot.chain(live).boxed()
    }

    /// Change the `shown` flag of the targeted answers.
    ///
    /// # Errors
    /// Returns error if the target index is out of range.
    pub fn set_visibility(
        &self,
        visibility: Visibility,
        target: AnswerTarget,
    ) -> Result<(), AnswerError> {
        self.state
            .answers
            .try_update(|answers| apply_visibility(answers, visibility, target))?;
        tracing::info!(?visibility, ?target, "answer visibility changed");
        Ok(())
    }

    /// Serve stores on `bus` from this process.
    ///
    /// Writes on the bus's outbound channel are applied here, and every
    /// change is echoed on its inbound channel. The current snapshot is
    /// pushed immediately.
    ///
    /// The bus only holds a weak reference to the authority: the bridge
    /// stays up while the caller keeps its `Arc<Authority>`, and outbound
    /// writes are dropped once it is gone.
    pub fn bridge(self: &Arc<Self>, bus: &Arc<EventBus>) {
        let authority: Weak<Self> = Arc::downgrade(self);
        let _ = bus.outbound().listen(move |payload| {
            let Some(authority) = authority.upgrade() else {
                tracing::debug!(name = payload.name(), "Authority gone, dropping update");
                return;
            };
            if let Err(e) = authority.apply(payload) {
                tracing::warn!("Rejected update: {e}");
            }
        });

        let echo = Arc::clone(bus);
        let _ = self
            .changes
            .listen(move |payload| echo.inbound().emit(payload));

        for payload in self.snapshot() {
            bus.inbound().emit(&payload);
        }
    }

    fn property(&self, name: &str) -> Option<&dyn Property> {
        self.properties
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, property)| property.as_ref())
    }
}

/// Publish every change of `store` on `changes` under `key`.
fn observe<T>(key: &'static str, store: &Writable<T>, changes: &Arc<Channel>)
where
    T: Serialize + Clone + Send + Sync + 'static,
{
    let changes = Arc::clone(changes);
    let _ = store.subscribe(move |value| match serde_json::to_value(value) {
        Ok(value) => changes.emit(&Payload::update_property(key, value)),
        Err(e) => tracing::error!(key, "Failed to encode property: {e}"),
    });
}
