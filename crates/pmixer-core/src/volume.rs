//! Volume scale and per-channel volume vectors.
//!
//! Volumes use the server's integer scale: `0` is silence, [`Volume::NORMAL`]
//! is 100 % and anything above it is software amplification.

use std::fmt;

use crate::error::{Error, Result};

/// Maximum number of channels in a volume vector.
pub const CHANNELS_MAX: usize = 32;

/// A single channel volume on the server's integer scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Volume(pub u32);

impl Volume {
    /// Silence.
    pub const MUTED: Self = Self(0);
    /// 100 %, the nominal reference level.
    pub const NORMAL: Self = Self(0x1_0000);
    /// The highest level a user interface should offer (+11 dB).
    pub const UI_MAX: Self = Self(99_957);
    /// Largest representable volume.
    pub const MAX: Self = Self(0x7fff_ffff);

    /// Build a volume from a percentage of [`Volume::NORMAL`].
    ///
    /// Negative and NaN inputs map to silence; results are capped at [`Volume::MAX`].
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_percent(percent: f64) -> Self {
        if percent.is_nan() || percent <= 0.0 {
            return Self::MUTED;
        }
        let raw = (percent / 100.0 * f64::from(Self::NORMAL.0)).round();
        if raw >= f64::from(Self::MAX.0) {
            Self::MAX
        } else {
            Self(raw as u32)
        }
    }

    /// This volume as a percentage of [`Volume::NORMAL`].
    #[must_use]
    pub fn percent(self) -> f64 {
        f64::from(self.0) * 100.0 / f64::from(Self::NORMAL.0)
    }

    /// Whether the value lies inside the representable range.
    #[must_use]
    pub fn is_valid(self) -> bool {
        self <= Self::MAX
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}%", self.percent())
    }
}

/// Ordered per-channel volumes of one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelVolumes {
    values: Vec<Volume>,
}

impl ChannelVolumes {
    /// Create a vector from per-channel values.
    ///
    /// # Errors
    /// Returns an error if there are no channels, more than [`CHANNELS_MAX`],
    /// or a value above [`Volume::MAX`].
    pub fn new(values: Vec<Volume>) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::NoChannels);
        }
        if values.len() > CHANNELS_MAX {
            return Err(Error::TooManyChannels(values.len()));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_valid()) {
            return Err(Error::InvalidVolume(bad.0));
        }
        Ok(Self { values })
    }

    /// Every channel set to the same level.
    ///
    /// # Errors
    /// Same conditions as [`ChannelVolumes::new`].
    pub fn uniform(channels: usize, volume: Volume) -> Result<Self> {
        Self::new(vec![volume; channels])
    }

    /// Number of channels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a constructed vector.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Per-channel values in channel order.
    #[must_use]
    pub fn values(&self) -> &[Volume] {
        &self.values
    }

    /// Mean of all channels.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn average(&self) -> Volume {
        let sum: u64 = self.values.iter().map(|v| u64::from(v.0)).sum();
        // Mean of u32 values always fits in u32.
        Volume((sum / self.values.len() as u64) as u32)
    }

    /// Raise each channel by `step`, never past `ceiling`.
    #[must_use]
    pub fn increase(&self, step: Volume, ceiling: Volume) -> Self {
        let values = self
            .values
            .iter()
            .map(|v| Volume(v.0.saturating_add(step.0).min(ceiling.0)))
            .collect();
        Self { values }
    }

    /// Lower each channel by `step`, stopping at silence.
    #[must_use]
    pub fn decrease(&self, step: Volume) -> Self {
        let values = self
            .values
            .iter()
            .map(|v| Volume(v.0.saturating_sub(step.0)))
            .collect();
        Self { values }
    }
}

/// Step size and ceiling used when adjusting volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeLimits {
    step: Volume,
    ceiling: Volume,
}

impl VolumeLimits {
    /// Default step: 1/20 of [`Volume::NORMAL`], i.e. 5 %.
    pub const DEFAULT_STEP: Volume = Volume(Volume::NORMAL.0 / 20);
    /// Default ceiling for increases.
    pub const DEFAULT_CEILING: Volume = Volume::UI_MAX;

    /// Create limits with a custom step and ceiling.
    ///
    /// # Errors
    /// Returns an error if either value is above [`Volume::MAX`].
    pub fn new(step: Volume, ceiling: Volume) -> Result<Self> {
        if !step.is_valid() {
            return Err(Error::InvalidLimits(format!("step {} exceeds maximum", step.0)));
        }
        if !ceiling.is_valid() {
            return Err(Error::InvalidLimits(format!("ceiling {} exceeds maximum", ceiling.0)));
        }
        Ok(Self { step, ceiling })
    }

    /// Amount added or removed per adjustment.
    #[must_use]
    pub fn step(&self) -> Volume {
        self.step
    }

    /// Upper bound for increases.
    #[must_use]
    pub fn ceiling(&self) -> Volume {
        self.ceiling
    }
}

impl Default for VolumeLimits {
    fn default() -> Self {
        Self {
            step: Self::DEFAULT_STEP,
            ceiling: Self::DEFAULT_CEILING,
        }
    }
}
