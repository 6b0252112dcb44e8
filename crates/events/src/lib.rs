//! Event bus and push-delivery infrastructure for the request engine.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`, carrying typed [`DomainEvent`]s.
//! - [`Audience`] -- pure recipient resolution for each event kind.
//! - [`PushClient`] -- best-effort push-transport client; failures are
//!   logged and swallowed, never surfaced to the triggering mutation.

pub mod bus;
pub mod push;

pub use bus::{Audience, DomainEvent, EventBus};
pub use push::PushClient;
