//! An in-process stand-in for a GPU/display stack.
//!
//! [`SimulatedPlatform`] has a manual clock, fences that are signalled by hand,
//! and scriptable frame timestamps. It exists so that the pacing core (and
//! applications built on it) can be exercised deterministically without a
//! device.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering},
    time::Duration,
};

use parking_lot::{Condvar, Mutex};

use crate::{
    frame::{FrameId, FrameTimestamps},
    limits::DEFAULT_REFRESH_PERIOD_NS,
    time::{PresentPeriod, PresentTime},
};

use super::{
    DisplayHandle, FenceError, FenceHandle, FenceStatus, FenceWait, Platform, SurfaceHandle,
    TimestampError, Unsupported,
};

/// Which optional capabilities the simulated platform exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    pub fences: bool,
    pub timestamps: bool,
    pub presentation_time: bool,
}

impl Capabilities {
    pub const ALL: Self = Self {
        fences: true,
        timestamps: true,
        presentation_time: true,
    };

    pub const NONE: Self = Self {
        fences: false,
        timestamps: false,
        presentation_time: false,
    };
}

/// What happens to newly created fences.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FenceBehavior {
    /// Fences are created already signalled.
    Signalled,
    /// Fences stay unsignalled until [`SimulatedPlatform::signal_fences`] is
    /// called. Waits block (in real time) until then or until they time out.
    Manual,
    /// Every wait reports an error.
    Error,
    /// Fence creation fails.
    CreationFails,
}

/// Per-frame timestamps generated automatically at swap time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutoTimestamps {
    /// Time from the swap until rendering completes.
    pub render_time: PresentPeriod,
}

#[derive(Debug, Default)]
struct SurfaceState {
    next_frame: u64,
    timestamps_enabled: bool,
    requested: Option<PresentTime>,
    frames: HashMap<FrameId, FrameTimestamps>,
}

#[derive(Debug)]
struct FenceState {
    next_handle: usize,
    signalled: HashMap<FenceHandle, bool>,
    destroyed: Vec<FenceHandle>,
}

#[derive(Debug)]
pub struct SimulatedPlatform {
    now: AtomicI64,
    refresh_period: Mutex<Option<PresentPeriod>>,
    capabilities: Capabilities,
    fence_behavior: Mutex<FenceBehavior>,
    fences: Mutex<FenceState>,
    fence_condvar: Condvar,
    fence_waits: AtomicUsize,
    surfaces: Mutex<HashMap<SurfaceHandle, SurfaceState>>,
    presentation_times: Mutex<Vec<(SurfaceHandle, PresentTime)>>,
    auto_timestamps: Mutex<Option<AutoTimestamps>>,
    enable_calls: AtomicUsize,
    clock_follows_waits: AtomicBool,
}

impl SimulatedPlatform {
    #[must_use]
    pub fn new(refresh_period: Option<PresentPeriod>, capabilities: Capabilities) -> Self {
        Self {
            now: AtomicI64::new(0),
            refresh_period: Mutex::new(refresh_period),
            capabilities,
            fence_behavior: Mutex::new(FenceBehavior::Signalled),
            fences: Mutex::new(FenceState {
                next_handle: 1,
                signalled: HashMap::new(),
                destroyed: Vec::new(),
            }),
            fence_condvar: Condvar::new(),
            fence_waits: AtomicUsize::new(0),
            surfaces: Mutex::new(HashMap::new()),
            presentation_times: Mutex::new(Vec::new()),
            auto_timestamps: Mutex::new(None),
            enable_calls: AtomicUsize::new(0),
            clock_follows_waits: AtomicBool::new(false),
        }
    }

    /// A 60 Hz display with every capability.
    #[must_use]
    pub fn display_60hz() -> Self {
        Self::new(
            Some(PresentPeriod::from_nanos(DEFAULT_REFRESH_PERIOD_NS)),
            Capabilities::ALL,
        )
    }

    // clock

    pub fn set_now(&self, time: PresentTime) {
        self.now.store(time.as_nanos(), Ordering::SeqCst);
    }

    pub fn advance(&self, period: PresentPeriod) {
        self.now.fetch_add(period.as_nanos(), Ordering::SeqCst);
    }

    /// Makes every fence wait advance the simulated clock by the time it
    /// actually blocked, so that measured GPU time shows up in the simulated
    /// timeline.
    pub fn set_clock_follows_waits(&self, enabled: bool) {
        self.clock_follows_waits.store(enabled, Ordering::SeqCst);
    }

    pub fn set_refresh_period(&self, period: Option<PresentPeriod>) {
        *self.refresh_period.lock() = period;
    }

    // fences

    pub fn set_fence_behavior(&self, behavior: FenceBehavior) {
        *self.fence_behavior.lock() = behavior;
    }

    /// Signals every outstanding fence and wakes blocked waits.
    pub fn signal_fences(&self) {
        let mut fences = self.fences.lock();
        for signalled in fences.signalled.values_mut() {
            *signalled = true;
        }
        self.fence_condvar.notify_all();
    }

    /// The number of fences that have been created and not yet destroyed.
    #[must_use]
    pub fn live_fences(&self) -> usize {
        self.fences.lock().signalled.len()
    }

    #[must_use]
    pub fn destroyed_fences(&self) -> Vec<FenceHandle> {
        self.fences.lock().destroyed.clone()
    }

    #[must_use]
    pub fn fence_waits(&self) -> usize {
        self.fence_waits.load(Ordering::SeqCst)
    }

    // surfaces and timestamps

    /// Queues a buffer on `surface`, consuming a frame id. If automatic
    /// timestamps are enabled, the frame's timestamps become available
    /// immediately, placed on the first vsync at or after the requested
    /// presentation time.
    pub fn swap_buffers(&self, surface: SurfaceHandle) -> FrameId {
        let now = self.now();
        let period = self
            .refresh_period
            .lock()
            .unwrap_or(PresentPeriod::from_nanos(DEFAULT_REFRESH_PERIOD_NS));
        let auto = *self.auto_timestamps.lock();

        let mut surfaces = self.surfaces.lock();
        let state = surfaces.entry(surface).or_default();
        let id = FrameId(state.next_frame);
        state.next_frame += 1;

        let requested = state.requested.take().unwrap_or(now);
        if let Some(auto) = auto {
            let rendering_completed = now + auto.render_time;
            let ready = rendering_completed.max(requested);
            let vsyncs = div_ceil(ready.as_nanos(), period.as_nanos());
            let composition_latched = PresentTime::from_nanos(vsyncs * period.as_nanos());

            state.frames.insert(
                id,
                FrameTimestamps {
                    requested,
                    rendering_completed,
                    composition_latched,
                    presented: composition_latched + period,
                },
            );
        }

        id
    }

    pub fn set_auto_timestamps(&self, auto: Option<AutoTimestamps>) {
        *self.auto_timestamps.lock() = auto;
    }

    /// Makes the timestamps of `frame` available.
    pub fn resolve_frame(
        &self,
        surface: SurfaceHandle,
        frame: FrameId,
        timestamps: FrameTimestamps,
    ) {
        self.surfaces
            .lock()
            .entry(surface)
            .or_default()
            .frames
            .insert(frame, timestamps);
    }

    /// Simulates the surface dropping its timestamp collection, e.g. after it
    /// was recreated.
    pub fn invalidate_surface(&self, surface: SurfaceHandle) {
        self.surfaces
            .lock()
            .entry(surface)
            .or_default()
            .timestamps_enabled = false;
    }

    #[must_use]
    pub fn enable_timestamp_calls(&self) -> usize {
        self.enable_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn presentation_times(&self) -> Vec<(SurfaceHandle, PresentTime)> {
        self.presentation_times.lock().clone()
    }
}

/// Integer division rounding toward positive infinity.
fn div_ceil(a: i64, b: i64) -> i64 {
    let q = a.div_euclid(b);
    if a.rem_euclid(b) == 0 {
        q
    } else {
        q + 1
    }
}

impl Platform for SimulatedPlatform {
    fn now(&self) -> PresentTime {
        PresentTime::from_nanos(self.now.load(Ordering::SeqCst))
    }

    fn refresh_period(&self) -> Option<PresentPeriod> {
        *self.refresh_period.lock()
    }

    fn create_fence(&self, _display: DisplayHandle) -> Result<FenceHandle, FenceError> {
        if !self.capabilities.fences {
            return Err(FenceError::Unsupported);
        }

        let behavior = *self.fence_behavior.lock();
        if behavior == FenceBehavior::CreationFails {
            return Err(FenceError::CreationFailed);
        }

        let mut fences = self.fences.lock();
        let handle = FenceHandle(fences.next_handle);
        fences.next_handle += 1;
        fences
            .signalled
            .insert(handle, behavior == FenceBehavior::Signalled);
        Ok(handle)
    }

    fn fence_status(&self, _display: DisplayHandle, fence: FenceHandle) -> FenceStatus {
        match self.fences.lock().signalled.get(&fence) {
            Some(true) => FenceStatus::Signalled,
            Some(false) => FenceStatus::Unsignalled,
            None => FenceStatus::Unknown,
        }
    }

    fn wait_fence(
        &self,
        _display: DisplayHandle,
        fence: FenceHandle,
        timeout: Duration,
    ) -> FenceWait {
        self.fence_waits.fetch_add(1, Ordering::SeqCst);

        if *self.fence_behavior.lock() == FenceBehavior::Error {
            return FenceWait::Error;
        }

        let start = std::time::Instant::now();
        let mut fences = self.fences.lock();

        let result = loop {
            match fences.signalled.get(&fence) {
                None => break FenceWait::Error,
                Some(true) => break FenceWait::Signalled,
                Some(false) => {
                    if self
                        .fence_condvar
                        .wait_for(&mut fences, timeout)
                        .timed_out()
                    {
                        break match fences.signalled.get(&fence) {
                            Some(true) => FenceWait::Signalled,
                            Some(false) => FenceWait::TimedOut,
                            None => FenceWait::Error,
                        };
                    }
                }
            }
        };

        if self.clock_follows_waits.load(Ordering::SeqCst) {
            self.advance(PresentPeriod::from_duration(start.elapsed()));
        }

        result
    }

    fn destroy_fence(&self, _display: DisplayHandle, fence: FenceHandle) {
        let mut fences = self.fences.lock();
        if fences.signalled.remove(&fence).is_some() {
            fences.destroyed.push(fence);
        }
        self.fence_condvar.notify_all();
    }

    fn next_frame_id(
        &self,
        _display: DisplayHandle,
        surface: SurfaceHandle,
    ) -> Result<FrameId, TimestampError> {
        if !self.capabilities.timestamps {
            return Err(TimestampError::Unsupported);
        }

        let mut surfaces = self.surfaces.lock();
        let state = surfaces.entry(surface).or_default();
        if !state.timestamps_enabled {
            return Err(TimestampError::SurfaceInvalid);
        }

        Ok(FrameId(state.next_frame))
    }

    fn frame_timestamps(
        &self,
        _display: DisplayHandle,
        surface: SurfaceHandle,
        frame: FrameId,
    ) -> Result<FrameTimestamps, TimestampError> {
        if !self.capabilities.timestamps {
            return Err(TimestampError::Unsupported);
        }

        let surfaces = self.surfaces.lock();
        let Some(state) = surfaces.get(&surface) else {
            return Err(TimestampError::SurfaceInvalid);
        };

        if !state.timestamps_enabled {
            return Err(TimestampError::SurfaceInvalid);
        }

        state
            .frames
            .get(&frame)
            .copied()
            .ok_or(TimestampError::Pending)
    }

    fn enable_timestamps(
        &self,
        _display: DisplayHandle,
        surface: SurfaceHandle,
    ) -> Result<(), Unsupported> {
        if !self.capabilities.timestamps {
            return Err(Unsupported);
        }

        self.enable_calls.fetch_add(1, Ordering::SeqCst);
        self.surfaces
            .lock()
            .entry(surface)
            .or_default()
            .timestamps_enabled = true;
        Ok(())
    }

    fn set_presentation_time(
        &self,
        _display: DisplayHandle,
        surface: SurfaceHandle,
        time: PresentTime,
    ) -> Result<(), Unsupported> {
        if !self.capabilities.presentation_time {
            return Err(Unsupported);
        }

        self.surfaces.lock().entry(surface).or_default().requested = Some(time);
        self.presentation_times.lock().push((surface, time));
        Ok(())
    }
}
