use std::sync::Arc;

use crate::{
    limits::DEFAULT_REFRESH_PERIOD_NS,
    platform::Platform,
    time::{FramesPerSecond, PresentPeriod, PresentTime},
};

/// The display's nominal refresh period and whether it was actually reported by
/// the display or substituted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshPeriod {
    pub period: PresentPeriod,
    pub is_detected: bool,
}

impl RefreshPeriod {
    pub const FALLBACK: Self = Self {
        period: PresentPeriod::from_nanos(DEFAULT_REFRESH_PERIOD_NS),
        is_detected: false,
    };

    #[must_use]
    pub fn rate(&self) -> FramesPerSecond {
        FramesPerSecond::from_period(self.period)
    }
}

/// The outcome of asking the display for its refresh period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Detection {
    Detected(PresentPeriod),
    /// The display reported nothing.
    Unknown,
    /// The display reported a zero or negative period.
    Invalid(PresentPeriod),
}

/// The monotonic clock presentation times are expressed in, together with the
/// display's refresh period.
pub struct PresentationClock<P: Platform> {
    platform: Arc<P>,
}

impl<P: Platform> PresentationClock<P> {
    pub fn new(platform: Arc<P>) -> Self {
        Self { platform }
    }

    #[must_use]
    pub fn now(&self) -> PresentTime {
        self.platform.now()
    }

    #[must_use]
    pub fn detect(&self) -> Detection {
        match self.platform.refresh_period() {
            Some(period) if period.is_positive() => Detection::Detected(period),
            Some(period) => Detection::Invalid(period),
            None => Detection::Unknown,
        }
    }

    /// The refresh period, falling back to 60 Hz when the display cannot
    /// report a usable one. Never zero.
    #[must_use]
    pub fn refresh_period(&self) -> RefreshPeriod {
        match self.detect() {
            Detection::Detected(period) => RefreshPeriod {
                period,
                is_detected: true,
            },
            Detection::Unknown | Detection::Invalid(_) => RefreshPeriod::FALLBACK,
        }
    }
}
