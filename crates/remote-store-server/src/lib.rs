//! Authoritative side of the remote stores.
//!
//! Provides:
//! - `GameState` - The values clients mirror
//! - `Authority` - Applies client updates and publishes changes
//! - Answer visibility commands
//! - WebSocket + HTTP transport
//! - `ServerConfig` loaded from the environment

pub mod answers;
pub mod authority;
pub mod config;
pub mod state;
pub mod websocket;

pub use answers::{AnswerError, AnswerTarget, Visibility};
pub use authority::{ApplyError, Authority};
pub use config::{ConfigError, ServerConfig};
pub use state::GameState;
pub use websocket::create_router;
