//! Observable stores mirrored through an event bus.
//!
//! This crate provides the fundamental building blocks:
//! - `Payload` - Tagged message envelope exchanged over the bus
//! - `EventBus` - Inbound/outbound channels shared by all stores
//! - `Writable` - Local observable value
//! - `RemoteStore` - Store whose writes round-trip through the bus
//! - `Store` trait and `StoreError`

mod listeners;

pub mod bus;
pub mod channel;
pub mod payload;
pub mod remote;
pub mod store;
pub mod traits;

pub use bus::{EventBus, RECV_EVENT, SEND_EVENT};
pub use channel::Channel;
pub use listeners::Unsubscriber;
pub use payload::{Payload, UpdateProperty};
pub use remote::{RemoteStore, create_remote_store};
pub use store::Writable;
pub use traits::{Store, StoreError};
