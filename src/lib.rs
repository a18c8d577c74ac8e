//! Frame pacing for render loops.
//!
//! Schedules buffer presentation on a fixed grid of display refresh periods
//! (for example 30 FPS on a 60 Hz panel), throttles the CPU against GPU
//! completion fences from a background thread, and gathers presentation
//! statistics from compositor frame timestamps.
//!
//! The GPU/display stack is reached through the [`Platform`] trait. Every
//! capability on it is optional; missing ones degrade pacing instead of
//! failing it.

pub mod clock;
pub mod config;
pub mod durations;
pub mod fence;
pub mod frame;
pub mod limits;
pub mod pacing;
pub mod platform;
pub mod schedule;
pub mod statistics;
pub mod system;
pub mod time;
pub mod tracer;

pub use clock::{PresentationClock, RefreshPeriod};
pub use config::{ConfigError, PacingConfig};
pub use durations::FrameDuration;
pub use fence::FenceWaiter;
pub use frame::{FrameId, FrameTimestamps, PendingFrame};
pub use pacing::{PacingController, PacingError, PacingStats};
pub use platform::{
    DisplayHandle, FenceError, FenceHandle, FenceStatus, FenceWait, Platform, SurfaceHandle,
    TimestampError, Unsupported, UnsupportedPlatform,
};
pub use statistics::{FrameHistogram, FrameStatisticsTracker, FrameStats, StatsReader};
pub use time::{FramesPerSecond, PresentPeriod, PresentTime};
pub use tracer::FrameTracer;
