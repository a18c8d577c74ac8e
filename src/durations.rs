use std::{collections::VecDeque, time::Duration};

use crate::limits::MAX_FRAME_DURATION;

/// CPU and GPU time spent on one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameDuration {
    pub cpu: Duration,
    pub gpu: Duration,
}

impl FrameDuration {
    /// Both values clamped to [`MAX_FRAME_DURATION`], so that a single stall
    /// (a breakpoint, a backgrounded app) does not dominate the average.
    #[must_use]
    pub fn clamped(cpu: Duration, gpu: Duration) -> Self {
        Self {
            cpu: cpu.min(MAX_FRAME_DURATION),
            gpu: gpu.min(MAX_FRAME_DURATION),
        }
    }

    /// The time the frame occupied the CPU/GPU pipeline, assuming the two run
    /// concurrently.
    #[must_use]
    pub fn frame_time(&self) -> Duration {
        self.cpu.max(self.gpu)
    }
}

/// A fixed-size rolling window of frame durations.
#[derive(Debug)]
pub struct FrameDurations {
    samples: VecDeque<FrameDuration>,
    capacity: usize,
    sum: FrameDuration,
}

impl FrameDurations {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            sum: FrameDuration::default(),
        }
    }

    pub fn add(&mut self, cpu: Duration, gpu: Duration) {
        let sample = FrameDuration::clamped(cpu, gpu);

        if self.samples.len() == self.capacity {
            if let Some(oldest) = self.samples.pop_front() {
                self.sum.cpu -= oldest.cpu;
                self.sum.gpu -= oldest.gpu;
            }
        }

        self.sum.cpu += sample.cpu;
        self.sum.gpu += sample.gpu;
        self.samples.push_back(sample);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The mean over the window, or zero if no samples were added yet.
    #[must_use]
    pub fn average(&self) -> FrameDuration {
        let Ok(count) = u32::try_from(self.samples.len()) else {
            return FrameDuration::default();
        };

        if count == 0 {
            return FrameDuration::default();
        }

        FrameDuration {
            cpu: self.sum.cpu / count,
            gpu: self.sum.gpu / count,
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.sum = FrameDuration::default();
    }
}
