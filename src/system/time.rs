use std::ops::{Add, AddAssign, Sub};

use super::platform_impl;

pub(crate) const NANOSECONDS_PER_SECOND: i64 = 1_000_000_000;
pub(crate) const NANOSECONDS_PER_SECOND_F64: f64 = 1_000_000_000.0;

/// A signed count of nanoseconds on the system's monotonic clock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Nanoseconds(pub i64);

impl Nanoseconds {
    pub const ZERO: Self = Self(0);

    /// Reads the monotonic clock. This is the same clock the compositor uses
    /// for presentation timestamps (`CLOCK_MONOTONIC` on unix, the performance
    /// counter on Windows).
    #[must_use]
    pub fn now() -> Self {
        Self(platform_impl::time::now_nanoseconds())
    }

    /// The refresh period of the primary display, if the operating system
    /// reports one.
    #[must_use]
    pub fn display_refresh_period() -> Option<Self> {
        platform_impl::time::display_refresh_period_nanoseconds().map(Self)
    }
}

impl Add for Nanoseconds {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Nanoseconds {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Nanoseconds {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl From<Hertz> for Nanoseconds {
    fn from(hertz: Hertz) -> Self {
        hertz.to_period()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Hertz(pub f64);

impl Hertz {
    #[must_use]
    pub fn from_period(period: Nanoseconds) -> Self {
        let period_s = period.0 / NANOSECONDS_PER_SECOND;
        let period_n = period.0 % NANOSECONDS_PER_SECOND;

        #[allow(clippy::cast_precision_loss)]
        let period_f = period_s as f64 + period_n as f64 / NANOSECONDS_PER_SECOND_F64;

        Self(1.0 / period_f)
    }

    #[must_use]
    pub fn to_period(self) -> Nanoseconds {
        let period_s = 1.0 / self.0;
        let period_n = period_s * NANOSECONDS_PER_SECOND_F64;

        #[allow(clippy::cast_possible_truncation)]
        Nanoseconds(period_n.round() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic() {
        let a = Nanoseconds::now();
        let b = Nanoseconds::now();
        assert!(b >= a);
    }

    #[test]
    fn hertz_period() {
        assert_eq!(Hertz(60.0).to_period(), Nanoseconds(16_666_667));
        assert_eq!(Hertz(120.0).to_period(), Nanoseconds(8_333_333));

        let rate = Hertz::from_period(Nanoseconds(11_111_111));
        assert!((rate.0 - 90.0).abs() < 0.001);
    }
}
