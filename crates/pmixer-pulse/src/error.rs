//! PulseAudio error types.

use thiserror::Error;

/// PulseAudio error type.
#[derive(Debug, Error)]
pub enum PulseError {
    #[error("PulseAudio connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Cannot determine default device: {0}")]
    DefaultDeviceUnknown(String),

    #[error("Cannot resolve device {name}: {reason}")]
    DeviceUnresolved { name: String, reason: String },

    #[error("MainLoop error: {0}")]
    MainLoopError(String),

    #[error("Invalid device record: {0}")]
    InvalidRecord(#[from] pmixer_core::Error),
}

impl PulseError {
    /// Whether this error comes from resolving the default device.
    #[must_use]
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            Self::DefaultDeviceUnknown(_) | Self::DeviceUnresolved { .. } | Self::InvalidRecord(_)
        )
    }
}

/// Result type for PulseAudio operations.
pub type PulseResult<T> = Result<T, PulseError>;
