//! pmixer PulseAudio - blocking adapter over the asynchronous client API.
//!
//! The PulseAudio client API is callback driven: every request returns an
//! operation handle and reports its result later, from inside a main loop
//! iteration. This crate turns that into straight-line calls:
//! - Connecting and waiting for the context to become ready
//! - Pumping the main loop until one operation finishes
//! - Resolving the default sink into a [`DeviceSnapshot`](pmixer_core::DeviceSnapshot)
//! - Applying volume and mute changes by sink index

pub mod backend;
pub mod connection;
pub mod driver;
pub mod error;
pub mod mutation;
pub mod native;
pub mod pump;
pub mod query;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{Backend, ContextState, ListItem, OperationState, PendingOperation, SinkRecord};
pub use connection::{Connection, ConnectionState};
pub use driver::{ClientSettings, Report, run};
pub use error::{PulseError, PulseResult};
pub use native::NativeBackend;
