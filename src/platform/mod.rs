//! The boundary between the pacing core and the GPU/display stack.
//!
//! Platform extensions (sync fences, frame timestamps, presentation time) are
//! optional on real devices. Rather than probing for entry points and checking
//! them before every call, the core talks to a single [`Platform`] trait whose
//! methods all have an "unsupported" default. A backend overrides exactly the
//! capabilities it has; everything else reports [`Unsupported`] (or the
//! equivalent variant) and the core degrades to a simpler strategy.
//!
//! Handles are opaque to the core. It never dereferences them, it only passes
//! them back to the platform that produced them.

pub mod simulated;

use std::time::Duration;

use crate::{
    frame::{FrameId, FrameTimestamps},
    system::time::Nanoseconds,
    time::{PresentPeriod, PresentTime},
};

/// An opaque display connection (e.g. an `EGLDisplay` or `VkDevice`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DisplayHandle(pub usize);

/// An opaque presentation surface (e.g. an `EGLSurface` or `VkSwapchainKHR`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub usize);

/// An opaque GPU fence that signals once all previously submitted work has
/// completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FenceHandle(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[error("The platform does not support this capability.")]
pub struct Unsupported;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum FenceError {
    #[error("The platform does not support GPU fences.")]
    Unsupported,

    #[error("The platform failed to create a fence.")]
    CreationFailed,
}

/// The result of polling a fence without blocking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FenceStatus {
    Signalled,
    Unsignalled,
    /// The status could not be queried. Callers should treat the fence as
    /// possibly pending.
    Unknown,
}

/// The result of blocking on a fence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FenceWait {
    Signalled,
    TimedOut,
    Error,
}

/// Why frame timestamps are not available. Each case implies a different retry
/// policy for the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum TimestampError {
    /// The platform has no frame timestamp support. Stop asking.
    #[error("The platform does not support frame timestamps.")]
    Unsupported,

    /// Timestamp collection is not (or no longer) enabled on the surface. Call
    /// [`Platform::enable_timestamps`] and try again later.
    #[error("The surface is not collecting timestamps.")]
    SurfaceInvalid,

    /// At least one timestamp for the frame is not known yet. Try again later
    /// with the same frame id.
    #[error("The frame's timestamps are still pending.")]
    Pending,
}

/// The GPU/display services the pacing core consumes.
///
/// Every method has a default that reports the capability as unsupported, so
/// an implementation only overrides what it actually provides. The clock
/// methods default to the system monotonic clock, which is the clock
/// presentation timestamps are expressed in on every supported platform.
///
/// Implementations are shared with the fence waiter's background thread and
/// must therefore be `Send + Sync`.
#[allow(unused_variables)]
pub trait Platform: Send + Sync + 'static {
    fn now(&self) -> PresentTime {
        PresentTime::now()
    }

    /// The nominal refresh period of the display, if known. A non-positive
    /// period is treated the same as an unknown one.
    fn refresh_period(&self) -> Option<PresentPeriod> {
        Nanoseconds::display_refresh_period().map(|ns| PresentPeriod::from_nanos(ns.0))
    }

    fn create_fence(&self, display: DisplayHandle) -> Result<FenceHandle, FenceError> {
        Err(FenceError::Unsupported)
    }

    fn fence_status(&self, display: DisplayHandle, fence: FenceHandle) -> FenceStatus {
        FenceStatus::Unknown
    }

    /// Blocks until `fence` signals or `timeout` elapses.
    fn wait_fence(
        &self,
        display: DisplayHandle,
        fence: FenceHandle,
        timeout: Duration,
    ) -> FenceWait {
        FenceWait::Error
    }

    fn destroy_fence(&self, display: DisplayHandle, fence: FenceHandle) {}

    /// The id the next buffer queued on `surface` will have.
    fn next_frame_id(
        &self,
        display: DisplayHandle,
        surface: SurfaceHandle,
    ) -> Result<FrameId, TimestampError> {
        Err(TimestampError::Unsupported)
    }

    fn frame_timestamps(
        &self,
        display: DisplayHandle,
        surface: SurfaceHandle,
        frame: FrameId,
    ) -> Result<FrameTimestamps, TimestampError> {
        Err(TimestampError::Unsupported)
    }

    /// Turns on timestamp collection for `surface`.
    fn enable_timestamps(
        &self,
        display: DisplayHandle,
        surface: SurfaceHandle,
    ) -> Result<(), Unsupported> {
        Err(Unsupported)
    }

    /// Asks the compositor not to show the next buffer queued on `surface`
    /// before `time`.
    fn set_presentation_time(
        &self,
        display: DisplayHandle,
        surface: SurfaceHandle,
        time: PresentTime,
    ) -> Result<(), Unsupported> {
        Err(Unsupported)
    }
}

/// A platform with no optional capabilities. Pacing against it falls back to
/// whatever cadence the native swap provides.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnsupportedPlatform;

impl Platform for UnsupportedPlatform {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_defaults() {
        let platform = UnsupportedPlatform;
        let display = DisplayHandle(1);
        let surface = SurfaceHandle(2);

        assert_eq!(platform.create_fence(display), Err(FenceError::Unsupported));
        assert_eq!(
            platform.fence_status(display, FenceHandle(3)),
            FenceStatus::Unknown
        );
        assert_eq!(
            platform.next_frame_id(display, surface),
            Err(TimestampError::Unsupported)
        );
        assert_eq!(
            platform.set_presentation_time(display, surface, PresentTime::from_nanos(0)),
            Err(Unsupported)
        );
    }
}
