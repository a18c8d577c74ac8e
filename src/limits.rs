//! Static limits and tunables.

use std::time::Duration;

/// The maximum number of submitted frames whose timestamps may be outstanding
/// at once. The platform only keeps a bounded history of frame timestamps, so
/// frames further behind than this will never resolve.
pub const MAX_FRAME_LAG: usize = 10;

/// The number of buckets in each frame histogram. The last bucket collects
/// everything at or beyond `MAX_FRAME_BUCKETS - 1` refresh periods.
pub const MAX_FRAME_BUCKETS: usize = 6;

/// Refresh period substituted when the display cannot report one (60 Hz).
pub const DEFAULT_REFRESH_PERIOD_NS: i64 = 16_666_667;

/// How long the fence waiter blocks on a single GPU fence before giving up on
/// it.
pub const DEFAULT_FENCE_TIMEOUT: Duration = Duration::from_millis(50);

/// Bias added to every histogram sample so that measurement noise right at a
/// bucket boundary lands in the upper bucket.
pub const DEFAULT_STATS_MARGIN: Duration = Duration::from_millis(1);

/// A frame time that exceeds a whole number of refresh periods by no more than
/// this is still considered to fit in that many periods.
pub const REFRESH_RATE_MARGIN_NS: i64 = 500;

/// Upper bound on a single CPU or GPU frame-duration sample.
pub const MAX_FRAME_DURATION: Duration = Duration::from_millis(100);

/// Default number of samples in the rolling frame-duration window.
pub const DEFAULT_DURATION_SAMPLES: usize = 60;
