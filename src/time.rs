use std::{
    ops::{Add, AddAssign, Mul, Sub},
    time::Duration,
};

use crate::system::time::{Hertz, Nanoseconds};

#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct FramesPerSecond(pub(crate) Hertz);

impl FramesPerSecond {
    #[must_use]
    pub const fn new(fps: f64) -> Self {
        Self(Hertz(fps))
    }

    #[must_use]
    pub fn from_period(period: PresentPeriod) -> Self {
        Self(Hertz::from_period(period.0))
    }

    #[must_use]
    pub fn as_f64(self) -> f64 {
        self.0 .0
    }
}

/// A point on the monotonic clock that presentation timestamps are expressed
/// in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PresentTime(Nanoseconds);

impl PresentTime {
    #[must_use]
    pub fn now() -> Self {
        Self(Nanoseconds::now())
    }

    #[must_use]
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(Nanoseconds(nanos))
    }

    #[must_use]
    pub const fn as_nanos(self) -> i64 {
        self.0 .0
    }

    /// The time elapsed since `earlier`, or zero if `earlier` is later than
    /// `self`.
    #[must_use]
    pub fn saturating_duration_since(self, earlier: Self) -> Duration {
        (self - earlier).to_duration()
    }
}

impl Add<PresentPeriod> for PresentTime {
    type Output = Self;

    fn add(self, rhs: PresentPeriod) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign<PresentPeriod> for PresentTime {
    fn add_assign(&mut self, rhs: PresentPeriod) {
        self.0 += rhs.0;
    }
}

impl Sub<PresentTime> for PresentTime {
    type Output = PresentPeriod;

    fn sub(self, rhs: PresentTime) -> Self::Output {
        PresentPeriod(self.0 - rhs.0)
    }
}

/// A signed span of time between two [`PresentTime`]s.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PresentPeriod(Nanoseconds);

impl PresentPeriod {
    pub const ZERO: Self = Self(Nanoseconds::ZERO);

    #[must_use]
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(Nanoseconds(nanos))
    }

    #[must_use]
    pub const fn as_nanos(self) -> i64 {
        self.0 .0
    }

    #[must_use]
    pub fn from_duration(duration: Duration) -> Self {
        Self::from_nanos(i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX))
    }

    /// Converts to a [`Duration`], clamping negative spans to zero.
    #[must_use]
    pub fn to_duration(self) -> Duration {
        Duration::from_nanos(u64::try_from(self.as_nanos()).unwrap_or(0))
    }

    #[must_use]
    pub fn is_positive(self) -> bool {
        self.as_nanos() > 0
    }

    /// How many whole `period`s fit in `self`, rounding toward negative
    /// infinity.
    ///
    /// ## Panics
    ///
    /// Panics if `period` is zero.
    #[must_use]
    pub fn div_floor(self, period: PresentPeriod) -> i64 {
        self.as_nanos().div_euclid(period.as_nanos())
    }
}

impl Add for PresentPeriod {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for PresentPeriod {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<i64> for PresentPeriod {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self(Nanoseconds(self.as_nanos().saturating_mul(rhs)))
    }
}

impl From<FramesPerSecond> for PresentPeriod {
    fn from(fps: FramesPerSecond) -> Self {
        Self(fps.0.into())
    }
}

impl From<Duration> for PresentPeriod {
    fn from(duration: Duration) -> Self {
        Self::from_duration(duration)
    }
}
