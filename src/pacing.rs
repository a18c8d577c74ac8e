//! The per-display frame pacing controller.
//!
//! A render loop drives a [`PacingController`] with two calls per frame:
//!
//! ```text
//! loop {
//!     controller.begin_frame();        // may block until the GPU catches up
//!     render();
//!     controller.end_frame(surface);   // schedules presentation
//!     swap_buffers(surface);
//! }
//! ```
//!
//! `begin_frame` throttles the CPU against the previous frame's GPU fence.
//! `end_frame` picks the next presentation time on the swap-interval grid,
//! hands it to the compositor, submits a new fence for the frame and collects
//! presentation statistics for frames that have since been shown.

use std::{sync::Arc, time::Duration};

use crate::{
    clock::{Detection, PresentationClock, RefreshPeriod},
    config::{validate_fence_timeout, validate_swap_interval, ConfigError, PacingConfig},
    durations::{FrameDuration, FrameDurations},
    fence::FenceWaiter,
    platform::{DisplayHandle, FenceError, FenceStatus, Platform, SurfaceHandle},
    schedule::{swap_interval_for_frame_time, FrameScheduler},
    statistics::{FrameStatisticsTracker, FrameStats, StatsReader},
    time::PresentTime,
    tracer::FrameTracer,
};

#[derive(Debug, thiserror::Error)]
pub enum PacingError {
    #[error("The pacing configuration is invalid: {0}")]
    Config(#[from] ConfigError),

    #[error("The display reported a non-positive refresh period of {0} ns.")]
    InvalidRefreshPeriod(i64),

    #[error("Failed to start the fence waiter thread.")]
    ThreadSpawn(#[from] std::io::Error),
}

/// A snapshot of a controller's telemetry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PacingStats {
    pub frames: FrameStats,
    /// How long the last GPU fence wait took.
    pub fence_pending_time: Duration,
    /// Mean CPU and GPU time over the recent frame window.
    pub average: FrameDuration,
    pub refresh_period: RefreshPeriod,
    pub swap_interval: u32,
    pub frame_number: u64,
}

/// Capabilities that have already been reported as missing.
#[derive(Default)]
struct Reported {
    fences: bool,
    fence_creation: bool,
    presentation_time: bool,
}

pub struct PacingController<P: Platform> {
    platform: Arc<P>,
    display: DisplayHandle,
    clock: PresentationClock<P>,
    refresh: RefreshPeriod,
    scheduler: FrameScheduler,
    fences: FenceWaiter,
    tracker: FrameStatisticsTracker,
    stats_enabled: bool,
    durations: FrameDurations,
    frame_started: Option<PresentTime>,
    cpu_time: Duration,
    frame_number: u64,
    tracers: Vec<Box<dyn FrameTracer>>,
    reported: Reported,
}

impl<P: Platform> PacingController<P> {
    /// Creates a controller for `display` and starts its fence waiter.
    ///
    /// # Errors
    ///
    /// Fails if `config` is invalid or the fence waiter thread could not be
    /// spawned.
    pub fn new(
        platform: Arc<P>,
        display: DisplayHandle,
        config: PacingConfig,
    ) -> Result<Self, PacingError> {
        config.validate()?;

        let clock = PresentationClock::new(platform.clone());
        let refresh = clock.refresh_period();
        if !refresh.is_detected {
            tracing::warn!(
                "Display refresh period unknown, assuming {:?}.",
                refresh.period.to_duration()
            );
        }

        let fences = FenceWaiter::new(platform.clone(), config.fence_timeout)?;

        tracing::info!(
            "Pacing at swap interval {} on a {:.2} Hz display.",
            config.swap_interval,
            refresh.rate().as_f64()
        );

        Ok(Self {
            platform,
            display,
            clock,
            refresh,
            scheduler: FrameScheduler::new(refresh.period, config.swap_interval),
            fences,
            tracker: FrameStatisticsTracker::new(config.max_frame_lag, config.stats_margin),
            stats_enabled: config.enable_stats,
            durations: FrameDurations::new(config.duration_samples),
            frame_started: None,
            cpu_time: Duration::ZERO,
            frame_number: 0,
            tracers: Vec::new(),
            reported: Reported::default(),
        })
    }

    #[must_use]
    pub fn display(&self) -> DisplayHandle {
        self.display
    }

    #[must_use]
    pub fn refresh_period(&self) -> RefreshPeriod {
        self.refresh
    }

    #[must_use]
    pub fn swap_interval(&self) -> u32 {
        self.scheduler.swap_interval()
    }

    /// The presentation time chosen for the most recent frame.
    #[must_use]
    pub fn last_presentation_time(&self) -> Option<PresentTime> {
        self.scheduler.last_presentation_time()
    }

    /// Sets the number of refresh periods between presented frames. Takes
    /// effect for the next frame.
    ///
    /// # Errors
    ///
    /// Rejects zero, leaving the current interval in place.
    pub fn set_swap_interval(&mut self, swap_interval: u32) -> Result<(), PacingError> {
        validate_swap_interval(swap_interval)?;

        if swap_interval != self.scheduler.swap_interval() {
            tracing::info!("Swap interval changed to {}.", swap_interval);
            self.scheduler.set_swap_interval(swap_interval);
            for tracer in &mut self.tracers {
                tracer.swap_interval_changed(swap_interval);
            }
        }

        Ok(())
    }

    /// Sets the swap interval to the smallest one that leaves at least
    /// `frame_time` per frame, and returns it.
    ///
    /// # Errors
    ///
    /// Rejects a zero frame time.
    pub fn set_frame_time(&mut self, frame_time: Duration) -> Result<u32, PacingError> {
        if frame_time.is_zero() {
            return Err(ConfigError::InvalidFrameTime.into());
        }

        let swap_interval = swap_interval_for_frame_time(frame_time, self.refresh.period);
        self.set_swap_interval(swap_interval)?;
        Ok(swap_interval)
    }

    /// # Errors
    ///
    /// Rejects a zero timeout.
    pub fn set_fence_timeout(&mut self, timeout: Duration) -> Result<(), PacingError> {
        validate_fence_timeout(timeout)?;
        self.fences.set_timeout(timeout);
        Ok(())
    }

    pub fn add_tracer(&mut self, tracer: Box<dyn FrameTracer>) {
        self.tracers.push(tracer);
    }

    /// Re-reads the display refresh period after a mode change. Presentation
    /// times already handed out are not revised.
    ///
    /// # Errors
    ///
    /// If the display reports a non-positive period, the previous period is
    /// kept and an error is returned.
    pub fn on_refresh_rate_changed(&mut self) -> Result<(), PacingError> {
        let refresh = match self.clock.detect() {
            Detection::Detected(period) => RefreshPeriod {
                period,
                is_detected: true,
            },
            Detection::Unknown => {
                tracing::warn!(
                    "Display refresh period unknown after mode change, using the default."
                );
                RefreshPeriod::FALLBACK
            }
            Detection::Invalid(period) => {
                return Err(PacingError::InvalidRefreshPeriod(period.as_nanos()));
            }
        };

        if refresh != self.refresh {
            tracing::info!(
                "Display refresh rate changed to {:.2} Hz.",
                refresh.rate().as_f64()
            );
        }

        self.refresh = refresh;
        self.scheduler.set_refresh_period(refresh.period);
        Ok(())
    }

    /// Call before starting work on a frame. Blocks if the GPU has not yet
    /// finished the previous frame, for at most the fence timeout.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn begin_frame(&mut self) {
        #[cfg(feature = "profile")]
        let _s = tracing_tracy::client::span!("Frame throttle");

        for tracer in &mut self.tracers {
            tracer.pre_wait();
        }

        match self.fences.poll(self.platform.as_ref()) {
            FenceStatus::Signalled => {}
            FenceStatus::Unsignalled | FenceStatus::Unknown => {
                if !self.fences.wait_for_idle() {
                    tracing::debug!("GPU fence abandoned, continuing without it.");
                }
            }
        }

        let gpu_time = self.fences.fence_pending_time();
        for tracer in &mut self.tracers {
            tracer.post_wait(self.cpu_time, gpu_time);
        }

        self.frame_number += 1;
        self.frame_started = Some(self.clock.now());

        let last = self.scheduler.last_presentation_time();
        for tracer in &mut self.tracers {
            tracer.start_frame(self.frame_number, last);
        }
    }

    /// Call after the frame's GPU work has been submitted and just before
    /// swapping buffers on `surface`. Returns the time the frame was scheduled
    /// to be presented at.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn end_frame(&mut self, surface: SurfaceHandle) -> PresentTime {
        let now = self.clock.now();

        if let Some(started) = self.frame_started.take() {
            self.cpu_time = now.saturating_duration_since(started);
            self.durations
                .add(self.cpu_time, self.fences.fence_pending_time());
        }

        for tracer in &mut self.tracers {
            tracer.pre_swap();
        }

        let target = self.compute_presentation_time(now);

        if self
            .platform
            .set_presentation_time(self.display, surface, target)
            .is_err()
            && !self.reported.presentation_time
        {
            self.reported.presentation_time = true;
            tracing::warn!(
                "Presentation time is not supported, relying on the native swap cadence."
            );
        }

        self.recycle_fence(now);

        if self.stats_enabled {
            self.tracker.capture(
                self.platform.as_ref(),
                self.display,
                surface,
                self.refresh.period,
            );
        }

        for tracer in &mut self.tracers {
            tracer.post_swap(target);
        }

        target
    }

    /// Computes the next presentation time as of `now` and advances the
    /// schedule to it. [`end_frame`](Self::end_frame) calls this; it is
    /// exposed for hosts that present by other means.
    pub fn compute_presentation_time(&mut self, now: PresentTime) -> PresentTime {
        self.scheduler.next_presentation_time(now)
    }

    #[must_use]
    pub fn stats(&self) -> PacingStats {
        PacingStats {
            frames: self.tracker.stats(),
            fence_pending_time: self.fences.fence_pending_time(),
            average: self.durations.average(),
            refresh_period: self.refresh,
            swap_interval: self.scheduler.swap_interval(),
            frame_number: self.frame_number,
        }
    }

    /// A handle for reading statistics from other threads.
    #[must_use]
    pub fn stats_reader(&self) -> StatsReader {
        self.tracker.reader(Some(self.fences.pending_time_source()))
    }

    /// Stops the fence waiter and releases the last fence. Equivalent to
    /// dropping the controller.
    pub fn shutdown(self) {
        tracing::debug!("Shutting down pacing controller.");
        drop(self);
    }

    /// Destroys the previous frame's fence and submits a new one.
    fn recycle_fence(&mut self, now: PresentTime) {
        if let Some(previous) = self.fences.take_fence() {
            self.platform
                .destroy_fence(previous.display, previous.fence);
        }

        match self.platform.create_fence(self.display) {
            Ok(fence) => self.fences.on_fence_created(self.display, fence, now),
            Err(FenceError::Unsupported) => {
                if !self.reported.fences {
                    self.reported.fences = true;
                    tracing::warn!("GPU fences are not supported, pacing without GPU throttling.");
                }
            }
            Err(FenceError::CreationFailed) => {
                if !self.reported.fence_creation {
                    self.reported.fence_creation = true;
                    tracing::warn!(
                        "Failed to create a GPU fence, skipping GPU throttling for this frame."
                    );
                }
            }
        }
    }
}

impl<P: Platform> Drop for PacingController<P> {
    fn drop(&mut self) {
        // The waiter thread must be gone before its last fence is destroyed.
        self.fences.stop();

        if let Some(last) = self.fences.take_fence() {
            self.platform.destroy_fence(last.display, last.fence);
        }
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use crate::{
        platform::{
            simulated::{AutoTimestamps, Capabilities, FenceBehavior, SimulatedPlatform},
            UnsupportedPlatform,
        },
        time::PresentPeriod,
    };

    use super::*;

    const DISPLAY: DisplayHandle = DisplayHandle(1);
    const SURFACE: SurfaceHandle = SurfaceHandle(7);
    const PERIOD: PresentPeriod = PresentPeriod::from_nanos(16_666_667);

    fn controller(
        platform: &Arc<SimulatedPlatform>,
        config: PacingConfig,
    ) -> PacingController<SimulatedPlatform> {
        PacingController::new(platform.clone(), DISPLAY, config).unwrap()
    }

    /// Renders for `work`, then presents and waits for the presentation time
    /// like a vsync-blocked swap would.
    fn frame(
        controller: &mut PacingController<SimulatedPlatform>,
        platform: &SimulatedPlatform,
        work: PresentPeriod,
    ) -> PresentTime {
        controller.begin_frame();
        platform.advance(work);
        let target = controller.end_frame(SURFACE);
        platform.swap_buffers(SURFACE);
        platform.set_now(target);
        target
    }

    /// Collects formatted log output for the duration of `f`.
    fn capture_logs(f: impl FnOnce()) -> String {
        #[derive(Clone, Default)]
        struct Buffer(Arc<Mutex<Vec<u8>>>);

        impl std::io::Write for Buffer {
            fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
                self.0.lock().extend_from_slice(bytes);
                Ok(bytes.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let buffer = Buffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, f);

        let bytes = buffer.0.lock().clone();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl FrameTracer for Recorder {
        fn pre_wait(&mut self) {
            self.0.lock().push("pre_wait".into());
        }

        fn post_wait(&mut self, _cpu_time: Duration, _gpu_time: Duration) {
            self.0.lock().push("post_wait".into());
        }

        fn pre_swap(&mut self) {
            self.0.lock().push("pre_swap".into());
        }

        fn post_swap(&mut self, _presentation_time: PresentTime) {
            self.0.lock().push("post_swap".into());
        }

        fn start_frame(&mut self, frame_number: u64, _presentation_time: Option<PresentTime>) {
            self.0.lock().push(format!("start_frame {frame_number}"));
        }

        fn swap_interval_changed(&mut self, swap_interval: u32) {
            self.0.lock().push(format!("swap_interval {swap_interval}"));
        }
    }

    #[test]
    fn paces_thirty_fps_on_sixty_hz() {
        let platform = Arc::new(SimulatedPlatform::display_60hz());
        platform.set_auto_timestamps(Some(AutoTimestamps {
            render_time: PresentPeriod::from_nanos(4_000_000),
        }));
        platform.set_now(PresentTime::from_nanos(1_000_000_000));

        let mut controller = controller(&platform, PacingConfig::default().with_swap_interval(2));

        let mut previous = frame(
            &mut controller,
            &platform,
            PresentPeriod::from_nanos(10_000_000),
        );
        for _ in 1..20 {
            let target = frame(
                &mut controller,
                &platform,
                PresentPeriod::from_nanos(10_000_000),
            );
            assert_eq!(target - previous, PERIOD * 2);
            previous = target;
        }

        let requested: Vec<_> = platform
            .presentation_times()
            .iter()
            .map(|(_, t)| *t)
            .collect();
        assert_eq!(requested.len(), 20);
        assert!(requested.windows(2).all(|w| w[0] <= w[1]));

        let stats = controller.stats();
        assert_eq!(stats.frame_number, 20);
        assert_eq!(stats.frames.total_frames, 19);
        assert_eq!(stats.average.cpu, Duration::from_millis(10));
        assert_eq!(stats.frames.offset_from_previous.buckets()[2], 18);

        assert_eq!(platform.live_fences(), 1);
        assert_eq!(platform.destroyed_fences().len(), 19);

        controller.shutdown();
        assert_eq!(platform.live_fences(), 0);
    }

    #[test]
    fn rejects_zero_swap_interval() {
        let platform = Arc::new(SimulatedPlatform::display_60hz());
        let mut controller = controller(&platform, PacingConfig::default().with_swap_interval(2));

        assert!(matches!(
            controller.set_swap_interval(0),
            Err(PacingError::Config(ConfigError::InvalidSwapInterval))
        ));
        assert_eq!(controller.swap_interval(), 2);

        assert!(matches!(
            PacingController::new(
                platform,
                DISPLAY,
                PacingConfig::default().with_swap_interval(0)
            ),
            Err(PacingError::Config(ConfigError::InvalidSwapInterval))
        ));
    }

    #[test]
    fn swap_interval_applies_to_next_frame() {
        let platform = Arc::new(SimulatedPlatform::display_60hz());
        let mut controller = controller(&platform, PacingConfig::default());

        let first = frame(&mut controller, &platform, PresentPeriod::ZERO);
        let second = frame(&mut controller, &platform, PresentPeriod::ZERO);
        assert_eq!(second - first, PERIOD);

        controller.set_swap_interval(3).unwrap();
        let third = frame(&mut controller, &platform, PresentPeriod::ZERO);
        assert_eq!(third - second, PERIOD * 3);
    }

    #[test]
    fn frame_time_sets_swap_interval() {
        let platform = Arc::new(SimulatedPlatform::display_60hz());
        let mut controller = controller(&platform, PacingConfig::default());

        assert_eq!(
            controller
                .set_frame_time(Duration::from_nanos(33_333_333))
                .unwrap(),
            2
        );
        assert_eq!(controller.swap_interval(), 2);
        assert_eq!(
            controller.set_frame_time(Duration::from_millis(5)).unwrap(),
            1
        );
        assert!(matches!(
            controller.set_frame_time(Duration::ZERO),
            Err(PacingError::Config(ConfigError::InvalidFrameTime))
        ));
        assert_eq!(controller.swap_interval(), 1);
    }

    #[test]
    fn fence_timeout_is_validated() {
        let platform = Arc::new(SimulatedPlatform::display_60hz());
        let mut controller = controller(&platform, PacingConfig::default());

        assert!(controller
            .set_fence_timeout(Duration::from_millis(10))
            .is_ok());
        assert!(matches!(
            controller.set_fence_timeout(Duration::ZERO),
            Err(PacingError::Config(ConfigError::InvalidFenceTimeout))
        ));
    }

    #[test]
    fn refresh_rate_change() {
        let platform = Arc::new(SimulatedPlatform::display_60hz());
        let mut controller = controller(&platform, PacingConfig::default());
        assert!(controller.refresh_period().is_detected);

        let first = frame(&mut controller, &platform, PresentPeriod::ZERO);

        let fast = PresentPeriod::from_nanos(8_333_333);
        platform.set_refresh_period(Some(fast));
        controller.on_refresh_rate_changed().unwrap();
        assert_eq!(controller.refresh_period().period, fast);

        let second = frame(&mut controller, &platform, PresentPeriod::ZERO);
        assert_eq!(second - first, fast);

        platform.set_refresh_period(Some(PresentPeriod::from_nanos(-1)));
        assert!(matches!(
            controller.on_refresh_rate_changed(),
            Err(PacingError::InvalidRefreshPeriod(-1))
        ));
        assert_eq!(controller.refresh_period().period, fast);

        platform.set_refresh_period(None);
        controller.on_refresh_rate_changed().unwrap();
        assert_eq!(controller.refresh_period(), RefreshPeriod::FALLBACK);
    }

    #[test]
    fn fence_creation_failure_does_not_block() {
        let platform = Arc::new(SimulatedPlatform::display_60hz());
        platform.set_fence_behavior(FenceBehavior::CreationFails);
        let config = PacingConfig::default().with_fence_timeout(Duration::from_secs(10));
        let mut controller = controller(&platform, config);

        let start = std::time::Instant::now();
        for _ in 0..5 {
            frame(&mut controller, &platform, PresentPeriod::ZERO);
        }
        assert!(start.elapsed() < Duration::from_secs(5));
        assert_eq!(platform.live_fences(), 0);
        assert_eq!(platform.fence_waits(), 0);
    }

    #[test]
    fn timed_out_fence_is_not_destroyed_twice() {
        let platform = Arc::new(SimulatedPlatform::display_60hz());
        platform.set_fence_behavior(FenceBehavior::Manual);
        let config = PacingConfig::default().with_fence_timeout(Duration::from_millis(5));
        let mut controller = controller(&platform, config);

        frame(&mut controller, &platform, PresentPeriod::ZERO);

        // The first fence times out in the waiter and is destroyed there.
        controller.begin_frame();
        assert_eq!(platform.destroyed_fences().len(), 1);

        controller
            .set_fence_timeout(Duration::from_secs(10))
            .unwrap();
        controller.end_frame(SURFACE);
        platform.swap_buffers(SURFACE);
        assert_eq!(platform.destroyed_fences().len(), 1);
        assert_eq!(platform.live_fences(), 1);

        platform.signal_fences();
        drop(controller);

        let destroyed = platform.destroyed_fences();
        assert_eq!(destroyed.len(), 2);
        assert_ne!(destroyed[0], destroyed[1]);
        assert_eq!(platform.live_fences(), 0);
    }

    #[test]
    fn degrades_without_capabilities() {
        let platform = Arc::new(SimulatedPlatform::new(Some(PERIOD), Capabilities::NONE));
        let mut controller = controller(&platform, PacingConfig::default());

        let first = frame(&mut controller, &platform, PresentPeriod::ZERO);
        let second = frame(&mut controller, &platform, PresentPeriod::ZERO);
        assert_eq!(second - first, PERIOD);

        let stats = controller.stats();
        assert_eq!(stats.frames.total_frames, 0);
        assert_eq!(stats.fence_pending_time, Duration::ZERO);
        assert!(platform.presentation_times().is_empty());
    }

    #[test]
    fn missing_capabilities_are_reported_once() {
        let logs = capture_logs(|| {
            let platform = Arc::new(SimulatedPlatform::new(Some(PERIOD), Capabilities::NONE));
            let mut controller = controller(&platform, PacingConfig::default());
            for _ in 0..10 {
                frame(&mut controller, &platform, PresentPeriod::ZERO);
            }
        });

        assert_eq!(logs.matches("GPU fences are not supported").count(), 1);
        assert_eq!(
            logs.matches("Presentation time is not supported").count(),
            1
        );

        let logs = capture_logs(|| {
            let platform = Arc::new(SimulatedPlatform::display_60hz());
            platform.set_fence_behavior(FenceBehavior::CreationFails);
            let mut controller = controller(&platform, PacingConfig::default());
            for _ in 0..10 {
                frame(&mut controller, &platform, PresentPeriod::ZERO);
            }
        });

        assert_eq!(logs.matches("Failed to create a GPU fence").count(), 1);
        assert_eq!(logs.matches("GPU fences are not supported").count(), 0);
    }

    #[test]
    fn unsupported_platform_smoke() {
        let platform = Arc::new(UnsupportedPlatform);
        let mut controller =
            PacingController::new(platform, DISPLAY, PacingConfig::default()).unwrap();

        let mut previous = None;
        for _ in 0..3 {
            controller.begin_frame();
            let target = controller.end_frame(SURFACE);
            assert!(previous.map_or(true, |p| target >= p));
            previous = Some(target);
        }

        controller.shutdown();
    }

    #[test]
    fn tracer_hooks() {
        let platform = Arc::new(SimulatedPlatform::display_60hz());
        let mut controller = controller(&platform, PacingConfig::default());

        let recorder = Recorder::default();
        controller.add_tracer(Box::new(recorder.clone()));

        frame(&mut controller, &platform, PresentPeriod::ZERO);
        controller.set_swap_interval(2).unwrap();
        controller.set_swap_interval(2).unwrap();

        assert_eq!(
            *recorder.0.lock(),
            vec![
                "pre_wait",
                "post_wait",
                "start_frame 1",
                "pre_swap",
                "post_swap",
                "swap_interval 2"
            ]
        );
    }

    #[test]
    fn stats_reader_from_another_thread() {
        let platform = Arc::new(SimulatedPlatform::display_60hz());
        platform.set_auto_timestamps(Some(AutoTimestamps {
            render_time: PresentPeriod::from_nanos(2_000_000),
        }));
        let mut controller = controller(&platform, PacingConfig::default());
        let reader = controller.stats_reader();

        for _ in 0..4 {
            frame(&mut controller, &platform, PresentPeriod::ZERO);
        }

        let frames = std::thread::spawn(move || reader.frame_stats())
            .join()
            .unwrap();
        assert_eq!(frames, controller.stats().frames);
        assert_eq!(frames.total_frames, 3);
    }

    #[test]
    fn stats_can_be_disabled() {
        let platform = Arc::new(SimulatedPlatform::display_60hz());
        platform.set_auto_timestamps(Some(AutoTimestamps {
            render_time: PresentPeriod::ZERO,
        }));
        let mut controller = controller(&platform, PacingConfig::default().with_stats(false));

        for _ in 0..3 {
            frame(&mut controller, &platform, PresentPeriod::ZERO);
        }

        assert_eq!(controller.stats().frames.total_frames, 0);
        assert_eq!(platform.enable_timestamp_calls(), 0);
    }
}
