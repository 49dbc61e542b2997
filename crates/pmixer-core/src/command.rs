//! Commands and the mutations they plan.

use std::fmt;
use std::str::FromStr;

use crate::device::DeviceSnapshot;
use crate::error::Error;
use crate::volume::{ChannelVolumes, VolumeLimits};

/// A user command selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Raise every channel by one step
    Increase,
    /// Lower every channel by one step
    Decrease,
    /// Toggle the mute flag
    Mute,
    /// Report the device without changing it
    Status,
}

impl Command {
    /// Command-line name of this command.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Increase => "inc",
            Self::Decrease => "dec",
            Self::Mute => "mute",
            Self::Status => "status",
        }
    }

    /// Decide the single mutation this command makes against `snapshot`.
    ///
    /// Returns `None` for commands that leave the device untouched.
    #[must_use]
    pub fn plan(self, snapshot: &DeviceSnapshot, limits: &VolumeLimits) -> Option<Mutation> {
        match self {
            Self::Increase => Some(Mutation::SetVolume {
                index: snapshot.index,
                volume: snapshot.volume.increase(limits.step(), limits.ceiling()),
            }),
            Self::Decrease => Some(Mutation::SetVolume {
                index: snapshot.index,
                volume: snapshot.volume.decrease(limits.step()),
            }),
            Self::Mute => Some(Mutation::SetMute {
                index: snapshot.index,
                muted: !snapshot.muted,
            }),
            Self::Status => None,
        }
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inc" => Ok(Self::Increase),
            "dec" => Ok(Self::Decrease),
            "mute" => Ok(Self::Mute),
            "status" => Ok(Self::Status),
            other => Err(Error::UnknownCommand(other.to_string())),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A change to apply to a device, addressed by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Replace the per-channel volume
    SetVolume { index: u32, volume: ChannelVolumes },
    /// Set the mute flag
    SetMute { index: u32, muted: bool },
}

impl Mutation {
    /// Index of the device this mutation targets.
    #[must_use]
    pub fn index(&self) -> u32 {
        match self {
            Self::SetVolume { index, .. } | Self::SetMute { index, .. } => *index,
        }
    }
}
