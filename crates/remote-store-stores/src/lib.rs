//! Stores backing the quiz front-end.
//!
//! Provides:
//! - `Answer` and `ConnectionStatus` value types
//! - `Stores` - the registry of remote and local stores

pub mod model;
pub mod registry;

pub use model::{Answer, ConnectionStatus};
pub use registry::{ANSWERS_KEY, Stores, TITLE_KEY};
