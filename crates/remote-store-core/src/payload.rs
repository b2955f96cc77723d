//! Message envelope exchanged over the event bus.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message carried on the inbound and outbound channels.
///
/// Serializes as `{"type": "update_property", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Payload {
    /// A named property took (or should take) a new value.
    UpdateProperty(UpdateProperty),
}

/// Body of an `update_property` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateProperty {
    /// Store key the update is addressed to.
    pub name: String,
    /// New value, as JSON.
    #[serde(alias = "data")]
    pub value: Value,
}

impl Payload {
    /// Build an `update_property` payload.
    #[must_use]
    pub fn update_property(name: impl Into<String>, value: Value) -> Self {
        Self::UpdateProperty(UpdateProperty {
            name: name.into(),
            value,
        })
    }

    /// Name of the property this payload addresses.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::UpdateProperty(update) => &update.name,
        }
    }

    /// Encode as JSON text.
    ///
    /// # Errors
    /// Returns error if the value cannot be serialized.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode from JSON text.
    ///
    /// # Errors
    /// Returns error if the text is not a known payload.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
