use std::time::Duration;

use crate::{
    limits::REFRESH_RATE_MARGIN_NS,
    time::{PresentPeriod, PresentTime},
};

/// Computes presentation times on a fixed grid of `refresh_period *
/// swap_interval` steps.
///
/// Once primed, the next time is derived from the previous one rather than
/// from the current time, so jitter in when the render thread gets around to
/// asking does not leak into the cadence. The grid is only abandoned when the
/// caller has fallen more than a full step behind, in which case the schedule
/// skips ahead to the first grid point still in the future.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameScheduler {
    last: Option<PresentTime>,
    refresh_period: PresentPeriod,
    swap_interval: u32,
}

impl FrameScheduler {
    /// ## Panics
    ///
    /// Panics if `refresh_period` is not positive or `swap_interval` is zero.
    #[must_use]
    pub fn new(refresh_period: PresentPeriod, swap_interval: u32) -> Self {
        assert!(refresh_period.is_positive());
        assert!(swap_interval >= 1);

        Self {
            last: None,
            refresh_period,
            swap_interval,
        }
    }

    #[must_use]
    pub fn last_presentation_time(&self) -> Option<PresentTime> {
        self.last
    }

    /// Anchors the grid at `last`, as if it had been the previous result.
    pub fn prime(&mut self, last: PresentTime) {
        self.last = Some(last);
    }

    #[must_use]
    pub fn refresh_period(&self) -> PresentPeriod {
        self.refresh_period
    }

    /// ## Panics
    ///
    /// Panics if `period` is not positive.
    pub fn set_refresh_period(&mut self, period: PresentPeriod) {
        assert!(period.is_positive());
        self.refresh_period = period;
    }

    #[must_use]
    pub fn swap_interval(&self) -> u32 {
        self.swap_interval
    }

    /// Takes effect on the next computed time; the previous time is kept.
    ///
    /// ## Panics
    ///
    /// Panics if `swap_interval` is zero.
    pub fn set_swap_interval(&mut self, swap_interval: u32) {
        assert!(swap_interval >= 1);
        self.swap_interval = swap_interval;
    }

    /// The spacing between consecutive presentation times.
    #[must_use]
    pub fn step(&self) -> PresentPeriod {
        self.refresh_period * i64::from(self.swap_interval)
    }

    /// Computes the time the next frame should be presented at and records it
    /// as the new previous time.
    pub fn next_presentation_time(&mut self, now: PresentTime) -> PresentTime {
        let target = match self.last {
            None => now + self.refresh_period,
            Some(last) => {
                let step = self.step();
                let target = last + step;

                if now - target > step {
                    let steps = (now - last).div_floor(step) + 1;
                    tracing::debug!(
                        missed = steps - 1,
                        "Presentation fell behind, skipping ahead."
                    );
                    last + step * steps
                } else {
                    target
                }
            }
        };

        self.last = Some(target);
        target
    }
}

/// The number of refresh periods needed to fit `frame_time`, rounding up
/// unless the remainder is within a small tolerance. Never less than 1.
#[must_use]
pub fn swap_interval_for_frame_time(frame_time: Duration, refresh_period: PresentPeriod) -> u32 {
    let frame_time = PresentPeriod::from_duration(frame_time);

    let whole = frame_time.div_floor(refresh_period);
    let remainder = frame_time - refresh_period * whole;

    let interval = if remainder.as_nanos() > REFRESH_RATE_MARGIN_NS {
        whole + 1
    } else {
        whole
    };

    u32::try_from(interval.max(1)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: PresentPeriod = PresentPeriod::from_nanos(16_666_667);

    #[test]
    fn first_time_is_one_period_out() {
        let mut scheduler = FrameScheduler::new(PERIOD, 2);
        let now = PresentTime::from_nanos(1_000);

        assert_eq!(scheduler.next_presentation_time(now), now + PERIOD);
        assert_eq!(scheduler.last_presentation_time(), Some(now + PERIOD));
    }

    #[test]
    fn thirty_fps_on_sixty_hz() {
        let t0 = PresentTime::from_nanos(5_000_000_000);
        let mut scheduler = FrameScheduler::new(PERIOD, 2);
        scheduler.prime(t0);

        for i in 1..=10 {
            // Jitter in the caller must not move the grid.
            let now = t0 + PresentPeriod::from_nanos(i * 33_000_000 - 4_000_000);
            assert_eq!(
                scheduler.next_presentation_time(now),
                t0 + PresentPeriod::from_nanos(2 * i * 16_666_667)
            );
        }
    }

    #[test]
    fn catches_up_after_stall() {
        let t0 = PresentTime::from_nanos(0);
        let mut scheduler = FrameScheduler::new(PERIOD, 2);
        scheduler.prime(t0);

        // Five steps later, plus a little.
        let now = t0 + scheduler.step() * 5 + PresentPeriod::from_nanos(10);
        let next = scheduler.next_presentation_time(now);
        assert_eq!(next, t0 + scheduler.step() * 6);
        assert!(next > now);
        assert!(next <= now + scheduler.step());

        // Exactly one step late still stays on the unadjusted grid.
        let now = next + scheduler.step() * 2;
        assert_eq!(
            scheduler.next_presentation_time(now),
            next + scheduler.step()
        );
    }

    #[test]
    fn monotonic_under_arbitrary_calls() {
        let mut scheduler = FrameScheduler::new(PERIOD, 1);
        let mut now = PresentTime::from_nanos(0);
        let mut previous = None;

        let mut seed = 0x2545_f491_u64;
        for i in 0..200 {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;

            #[allow(clippy::cast_possible_wrap)]
            let jump = (seed % 80_000_000) as i64;
            now += PresentPeriod::from_nanos(jump);

            if i % 37 == 0 {
                scheduler.set_swap_interval(1 + (i % 3) as u32);
            }

            let next = scheduler.next_presentation_time(now);
            if let Some(previous) = previous {
                assert!(next >= previous);
            }
            previous = Some(next);
        }
    }

    #[test]
    fn swap_interval_change_keeps_anchor() {
        let t0 = PresentTime::from_nanos(0);
        let mut scheduler = FrameScheduler::new(PERIOD, 1);
        scheduler.prime(t0);

        scheduler.set_swap_interval(3);
        assert_eq!(scheduler.last_presentation_time(), Some(t0));
        assert_eq!(scheduler.next_presentation_time(t0), t0 + PERIOD * 3);
    }

    #[test]
    fn interval_from_frame_time() {
        let ms = Duration::from_millis;
        assert_eq!(swap_interval_for_frame_time(ms(5), PERIOD), 1);
        assert_eq!(swap_interval_for_frame_time(ms(16), PERIOD), 1);
        assert_eq!(swap_interval_for_frame_time(ms(17), PERIOD), 2);
        assert_eq!(
            swap_interval_for_frame_time(Duration::from_nanos(33_333_333), PERIOD),
            2
        );
        assert_eq!(
            swap_interval_for_frame_time(Duration::from_nanos(33_333_834), PERIOD),
            2
        );
        assert_eq!(
            swap_interval_for_frame_time(Duration::from_nanos(33_334_335), PERIOD),
            3
        );
        assert_eq!(swap_interval_for_frame_time(ms(50), PERIOD), 3);
    }
}
