use rustix::time::{clock_gettime, ClockId};

use crate::system::time::NANOSECONDS_PER_SECOND;

pub fn now_nanoseconds() -> i64 {
    let timespec = clock_gettime(ClockId::Monotonic);
    let seconds = i64::try_from(timespec.tv_sec).unwrap_or(0);
    let nanos = i64::try_from(timespec.tv_nsec).unwrap_or(0);

    seconds
        .saturating_mul(NANOSECONDS_PER_SECOND)
        .saturating_add(nanos)
}

/// There is no display-independent way to ask for the refresh period here; it
/// has to come from the windowing system through the platform.
pub fn display_refresh_period_nanoseconds() -> Option<i64> {
    None
}
