use std::ops::Sub;

use crate::{
    platform::{DisplayHandle, SurfaceHandle},
    time::{PresentPeriod, PresentTime},
};

/// The platform's identifier for a submitted buffer. Identifiers increase
/// monotonically per surface and are used to fetch the buffer's timestamps
/// once the compositor has them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameId(pub u64);

impl FrameId {
    /// The number of frames from `earlier` to `self`, or zero if `earlier` is
    /// not actually earlier.
    #[must_use]
    pub fn frames_since(self, earlier: Self) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl Sub for FrameId {
    type Output = u64;

    fn sub(self, rhs: Self) -> Self::Output {
        self.frames_since(rhs)
    }
}

/// Compositor timestamps for one presented frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameTimestamps {
    /// The presentation time the application asked for.
    pub requested: PresentTime,
    /// When the GPU finished rendering the buffer.
    pub rendering_completed: PresentTime,
    /// When the compositor latched the buffer for composition.
    pub composition_latched: PresentTime,
    /// When the buffer actually became visible.
    pub presented: PresentTime,
}

impl FrameTimestamps {
    /// How long the finished buffer sat waiting for the compositor.
    #[must_use]
    pub fn idle(&self) -> PresentPeriod {
        self.composition_latched - self.rendering_completed
    }

    /// How far past the requested time the buffer was shown.
    #[must_use]
    pub fn late(&self) -> PresentPeriod {
        self.presented - self.requested
    }
}

/// A frame submitted for presentation whose timestamps have not yet been
/// retrieved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingFrame {
    pub display: DisplayHandle,
    pub surface: SurfaceHandle,
    pub id: FrameId,
    /// When the frame was handed to the tracker, just before the swap.
    pub enqueued: PresentTime,
}
