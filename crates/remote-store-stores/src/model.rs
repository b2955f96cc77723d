//! Values held by the quiz stores.

use serde::{Deserialize, Serialize};

/// One answer on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub id: u32,
    pub text: String,
    /// Share of the survey that gave this answer.
    pub votes: u32,
    /// Whether the answer is revealed to players.
    pub shown: bool,
}

impl Answer {
    /// Create a hidden answer.
    #[must_use]
    pub fn new(id: u32, text: impl Into<String>, votes: u32) -> Self {
        Self {
            id,
            text: text.into(),
            votes,
            shown: false,
        }
    }
}

/// State of the link to the collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// No link; the initial state.
    #[default]
    Disconnected,
    /// Link is being established.
    Connecting,
    /// Link is up.
    Connected,
}

impl ConnectionStatus {
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_answer_field_names() {
        let answer = Answer::new(1, "Popular Answer", 80);
        assert_eq!(
            serde_json::to_value(&answer).unwrap(),
            json!({"id": 1, "text": "Popular Answer", "votes": 80, "shown": false})
        );
    }

    #[test]
    fn test_connection_status_default() {
        assert_eq!(ConnectionStatus::default(), ConnectionStatus::Disconnected);
        assert!(!ConnectionStatus::Connecting.is_connected());
        assert!(ConnectionStatus::Connected.is_connected());
    }
}
