//! pmixer core - volume domain, device snapshots and commands.
//!
//! This crate holds everything that can be reasoned about without a running
//! audio server: the integer volume scale, per-channel volume vectors, the
//! snapshot of a device, and the decision of which mutation a command makes.

pub mod command;
pub mod device;
pub mod error;
pub mod volume;

pub use command::{Command, Mutation};
pub use device::DeviceSnapshot;
pub use error::{Error, Result};
pub use volume::{CHANNELS_MAX, ChannelVolumes, Volume, VolumeLimits};
