//! Presentation statistics gathered from compositor frame timestamps.
//!
//! Timestamps for a frame only become available some frames after it was
//! queued, so [`FrameStatisticsTracker`] keeps a short FIFO of frames it has
//! not heard back about yet. Each resolved frame is bucketed, in units of the
//! display refresh period, into a handful of histograms.

use std::{sync::Arc, time::Duration};

use arrayvec::ArrayVec;
use parking_lot::Mutex;

use crate::{
    fence::PendingTimeSource,
    frame::{FrameId, FrameTimestamps, PendingFrame},
    limits::{MAX_FRAME_BUCKETS, MAX_FRAME_LAG},
    platform::{DisplayHandle, Platform, SurfaceHandle, TimestampError},
    time::{PresentPeriod, PresentTime},
};

/// Counts of frames by how many refresh periods an interval spanned. The last
/// bucket collects everything at or beyond it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameHistogram {
    buckets: [u64; MAX_FRAME_BUCKETS],
}

impl FrameHistogram {
    #[must_use]
    pub fn buckets(&self) -> &[u64; MAX_FRAME_BUCKETS] {
        &self.buckets
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.buckets.iter().sum()
    }

    /// Increments the bucket for `value` and returns its index.
    fn record(&mut self, value: PresentPeriod, refresh_period: PresentPeriod) -> usize {
        let index = value
            .div_floor(refresh_period)
            .clamp(0, MAX_FRAME_BUCKETS as i64 - 1);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let index = index as usize;

        self.buckets[index] += 1;
        index
    }
}

/// A snapshot of the presentation histograms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// The number of frames whose timestamps were resolved.
    pub total_frames: u64,
    /// Time between the GPU finishing a frame and the compositor latching it.
    pub idle: FrameHistogram,
    /// Time between the requested and the actual presentation.
    pub late: FrameHistogram,
    /// Time between consecutive presentations.
    pub offset_from_previous: FrameHistogram,
    /// Time between the frame being queued and it becoming visible.
    pub latency: FrameHistogram,
}

pub struct FrameStatisticsTracker {
    pending: ArrayVec<PendingFrame, MAX_FRAME_LAG>,
    stats: Arc<Mutex<FrameStats>>,
    /// The surface timestamp collection was last turned on for.
    armed: Option<SurfaceHandle>,
    disabled: bool,
    margin: PresentPeriod,
    max_lag: usize,
    previous_presented: Option<PresentTime>,
}

impl FrameStatisticsTracker {
    /// Creates a tracker that keeps at most `max_lag` unresolved frames and
    /// pads idle, late and latency intervals by `margin` before bucketing.
    #[must_use]
    pub fn new(max_lag: usize, margin: Duration) -> Self {
        Self {
            pending: ArrayVec::new(),
            stats: Arc::new(Mutex::new(FrameStats::default())),
            armed: None,
            disabled: false,
            margin: PresentPeriod::from_duration(margin),
            max_lag: max_lag.clamp(1, MAX_FRAME_LAG),
            previous_presented: None,
        }
    }

    /// Records the frame about to be queued on `surface` and folds in the
    /// timestamps of any earlier frames the platform has since resolved.
    ///
    /// Must be called just before the buffer swap, once per frame.
    pub fn capture<P: Platform>(
        &mut self,
        platform: &P,
        display: DisplayHandle,
        surface: SurfaceHandle,
        refresh_period: PresentPeriod,
    ) {
        if self.disabled {
            return;
        }

        if self.armed != Some(surface) {
            if !self.arm(platform, display, surface) {
                return;
            }
            // Frames queued on a previous surface will never resolve.
            self.pending.clear();
            self.previous_presented = None;
        }

        match platform.next_frame_id(display, surface) {
            Ok(id) => {
                self.evict_behind(id);
                if self.pending.len() >= self.max_lag {
                    self.pending.remove(0);
                    self.previous_presented = None;
                }

                self.pending.push(PendingFrame {
                    display,
                    surface,
                    id,
                    enqueued: platform.now(),
                });
            }
            Err(TimestampError::Unsupported) => {
                self.disable();
                return;
            }
            // This frame goes untracked.
            Err(TimestampError::SurfaceInvalid) => {
                if !self.rearm(platform, display, surface) {
                    return;
                }
            }
            Err(error) => {
                tracing::trace!(%error, "Could not get the next frame id.");
            }
        }

        self.resolve(platform, refresh_period);
    }

    /// The current histograms.
    #[must_use]
    pub fn stats(&self) -> FrameStats {
        *self.stats.lock()
    }

    /// Frames queued but not yet resolved, oldest first.
    #[must_use]
    pub fn pending_frames(&self) -> &[PendingFrame] {
        &self.pending
    }

    /// Whether capture stopped because the platform has no timestamp support.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub(crate) fn reader(&self, fence: Option<PendingTimeSource>) -> StatsReader {
        StatsReader {
            stats: self.stats.clone(),
            fence,
        }
    }

    fn arm<P: Platform>(
        &mut self,
        platform: &P,
        display: DisplayHandle,
        surface: SurfaceHandle,
    ) -> bool {
        if platform.enable_timestamps(display, surface).is_err() {
            self.disable();
            return false;
        }

        self.armed = Some(surface);
        true
    }

    /// Re-enables timestamps on a surface that stopped collecting them.
    fn rearm<P: Platform>(
        &mut self,
        platform: &P,
        display: DisplayHandle,
        surface: SurfaceHandle,
    ) -> bool {
        tracing::debug!(
            ?surface,
            "Surface stopped collecting timestamps, re-enabling."
        );
        self.armed = None;
        self.arm(platform, display, surface)
    }

    fn disable(&mut self) {
        tracing::info!("Frame timestamps are not supported, disabling frame statistics.");
        self.disabled = true;
        self.pending.clear();
    }

    /// Drops pending frames that are `max_lag` or more frames behind `newest`.
    fn evict_behind(&mut self, newest: FrameId) {
        let max_lag = self.max_lag as u64;
        let stale = self
            .pending
            .iter()
            .take_while(|f| newest - f.id >= max_lag)
            .count();
        if stale > 0 {
            tracing::debug!(stale, "Evicting frames whose timestamps never arrived.");
            self.pending.drain(..stale);
            self.previous_presented = None;
        }
    }

    fn resolve<P: Platform>(&mut self, platform: &P, refresh_period: PresentPeriod) {
        while let Some(front) = self.pending.first().copied() {
            match platform.frame_timestamps(front.display, front.surface, front.id) {
                Ok(timestamps) => {
                    self.pending.remove(0);
                    self.record(&front, &timestamps, refresh_period);
                }
                Err(TimestampError::Pending) => break,
                Err(TimestampError::SurfaceInvalid) => {
                    self.rearm(platform, front.display, front.surface);
                    break;
                }
                Err(TimestampError::Unsupported) => {
                    self.disable();
                    break;
                }
            }
        }
    }

    fn record(
        &mut self,
        frame: &PendingFrame,
        timestamps: &FrameTimestamps,
        refresh_period: PresentPeriod,
    ) {
        let mut stats = self.stats.lock();

        stats.total_frames += 1;
        stats
            .idle
            .record(timestamps.idle() + self.margin, refresh_period);
        stats
            .late
            .record(timestamps.late() + self.margin, refresh_period);
        stats.latency.record(
            (timestamps.presented - frame.enqueued) + self.margin,
            refresh_period,
        );

        if let Some(previous) = self.previous_presented {
            stats
                .offset_from_previous
                .record(timestamps.presented - previous, refresh_period);
        }

        self.previous_presented = Some(timestamps.presented);
    }
}

/// A cloneable, thread-safe view of a controller's telemetry.
#[derive(Clone)]
pub struct StatsReader {
    stats: Arc<Mutex<FrameStats>>,
    fence: Option<PendingTimeSource>,
}

impl StatsReader {
    #[must_use]
    pub fn frame_stats(&self) -> FrameStats {
        *self.stats.lock()
    }

    /// How long the last GPU fence wait took. Zero if fences are unsupported.
    #[must_use]
    pub fn fence_pending_time(&self) -> Duration {
        self.fence
            .as_ref()
            .map_or(Duration::ZERO, PendingTimeSource::get)
    }
}
