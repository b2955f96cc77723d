//! Authoritative game state.

use remote_store_core::Writable;
use remote_store_stores::Answer;

/// Values every client mirrors.
///
/// Add new properties to `Authority::new` as well, or clients will never
/// see them.
#[derive(Debug, Clone)]
pub struct GameState {
    pub title: Writable<String>,
    pub answers: Writable<Vec<Answer>>,
}

impl GameState {
    /// Create the state a fresh game starts with.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Writable::new(title.into()),
            answers: Writable::new(default_answers()),
        }
    }
}

fn default_answers() -> Vec<Answer> {
    vec![
        Answer::new(1, "Popular Answer", 80),
        Answer {
            shown: true,
            ..Answer::new(2, "Unpopular Answer", 20)
        },
    ]
}
