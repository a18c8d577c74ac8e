use std::time::Duration;

use crate::time::PresentTime;

/// Callbacks into the application around each paced frame, e.g. for driving an
/// external profiler. Every method defaults to doing nothing.
///
/// Tracers run on the render thread, inside the pacing calls, and should
/// return quickly.
#[allow(unused_variables)]
pub trait FrameTracer: Send {
    /// Before the controller possibly blocks on the previous frame's fence.
    fn pre_wait(&mut self) {}

    /// After the wait, with the CPU time of the previous frame and the last
    /// measured GPU time.
    fn post_wait(&mut self, cpu_time: Duration, gpu_time: Duration) {}

    /// Before the presentation time is applied to the surface.
    fn pre_swap(&mut self) {}

    fn post_swap(&mut self, presentation_time: PresentTime) {}

    /// At the start of every frame. `presentation_time` is the time the
    /// previous frame was scheduled for, if any.
    fn start_frame(&mut self, frame_number: u64, presentation_time: Option<PresentTime>) {}

    fn swap_interval_changed(&mut self, swap_interval: u32) {}
}
