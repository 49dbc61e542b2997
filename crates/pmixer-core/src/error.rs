//! Error types for pmixer core.

use thiserror::Error;

/// Core error type for pmixer operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Invalid volume value: {0} (must be at most {max})", max = crate::Volume::MAX.0)]
    InvalidVolume(u32),

    #[error("Too many channels: {0} (at most {max} supported)", max = crate::CHANNELS_MAX)]
    TooManyChannels(usize),

    #[error("Channel volume vector has no channels")]
    NoChannels,

    #[error("Unknown command: {0} (expected one of inc, dec, mute, status)")]
    UnknownCommand(String),

    #[error("Invalid volume limits: {0}")]
    InvalidLimits(String),
}

/// Result type alias for pmixer core operations.
pub type Result<T> = std::result::Result<T, Error>;
