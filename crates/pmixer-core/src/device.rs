//! Device snapshots.

use crate::volume::ChannelVolumes;

/// Point-in-time state of one output device as last reported by the server.
///
/// A snapshot is never updated in place; querying the server again is the
/// only way to observe newer state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSnapshot {
    /// Server-assigned index, stable while the connection lives
    pub index: u32,
    /// Device name, as reported by the server
    pub name: String,
    /// Whether the device is muted
    pub muted: bool,
    /// Per-channel volume
    pub volume: ChannelVolumes,
}
