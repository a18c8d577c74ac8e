use std::time::Duration;

use crate::limits::{
    DEFAULT_DURATION_SAMPLES, DEFAULT_FENCE_TIMEOUT, DEFAULT_STATS_MARGIN, MAX_FRAME_LAG,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("The swap interval must be at least 1.")]
    InvalidSwapInterval,

    #[error("The fence timeout must be greater than zero.")]
    InvalidFenceTimeout,

    #[error("The frame time must be greater than zero.")]
    InvalidFrameTime,

    #[error("The frame lag must be between 1 and {max}, got {0}.", max = MAX_FRAME_LAG)]
    InvalidFrameLag(usize),

    #[error("The frame duration window must hold at least one sample.")]
    InvalidDurationSamples,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PacingConfig {
    /// The number of refresh periods between presented frames.
    pub swap_interval: u32,
    /// How long the fence waiter blocks on one GPU fence before giving up.
    pub fence_timeout: Duration,
    /// How many frames may wait for their timestamps before the oldest is
    /// dropped.
    pub max_frame_lag: usize,
    /// Added to idle, late and latency samples before bucketing.
    pub stats_margin: Duration,
    pub enable_stats: bool,
    /// Size of the rolling CPU/GPU duration window.
    pub duration_samples: usize,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            swap_interval: 1,
            fence_timeout: DEFAULT_FENCE_TIMEOUT,
            max_frame_lag: MAX_FRAME_LAG,
            stats_margin: DEFAULT_STATS_MARGIN,
            enable_stats: true,
            duration_samples: DEFAULT_DURATION_SAMPLES,
        }
    }
}

impl PacingConfig {
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: u32) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    #[must_use]
    pub fn with_fence_timeout(mut self, timeout: Duration) -> Self {
        self.fence_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_max_frame_lag(mut self, max_frame_lag: usize) -> Self {
        self.max_frame_lag = max_frame_lag;
        self
    }

    #[must_use]
    pub fn with_stats_margin(mut self, margin: Duration) -> Self {
        self.stats_margin = margin;
        self
    }

    #[must_use]
    pub fn with_stats(mut self, enabled: bool) -> Self {
        self.enable_stats = enabled;
        self
    }

    #[must_use]
    pub fn with_duration_samples(mut self, samples: usize) -> Self {
        self.duration_samples = samples;
        self
    }

    /// # Errors
    ///
    /// Returns the first field that is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_swap_interval(self.swap_interval)?;
        validate_fence_timeout(self.fence_timeout)?;

        if !(1..=MAX_FRAME_LAG).contains(&self.max_frame_lag) {
            return Err(ConfigError::InvalidFrameLag(self.max_frame_lag));
        }

        if self.duration_samples == 0 {
            return Err(ConfigError::InvalidDurationSamples);
        }

        Ok(())
    }
}

pub(crate) fn validate_swap_interval(swap_interval: u32) -> Result<(), ConfigError> {
    if swap_interval == 0 {
        Err(ConfigError::InvalidSwapInterval)
    } else {
        Ok(())
    }
}

pub(crate) fn validate_fence_timeout(timeout: Duration) -> Result<(), ConfigError> {
    if timeout.is_zero() {
        Err(ConfigError::InvalidFenceTimeout)
    } else {
        Ok(())
    }
}
