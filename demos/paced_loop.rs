//! Paces a simulated 60 Hz display at 30 FPS and prints the resulting
//! presentation statistics.

use std::{sync::Arc, time::Duration};

use framepace::{
    platform::simulated::{AutoTimestamps, SimulatedPlatform},
    FrameHistogram, FrameTracer, PacingConfig, PacingController, Platform, PresentPeriod,
    PresentTime, SurfaceHandle,
};

#[cfg(feature = "profile")]
use tracing_subscriber::layer::SubscriberExt;

const DISPLAY: framepace::DisplayHandle = framepace::DisplayHandle(1);
const SURFACE: SurfaceHandle = SurfaceHandle(1);
const FRAMES: u64 = 120;

struct LogTracer;

impl FrameTracer for LogTracer {
    fn start_frame(&mut self, frame_number: u64, presentation_time: Option<PresentTime>) {
        if frame_number % 30 == 0 {
            tracing::info!("frame {frame_number}, previous target {presentation_time:?}");
        }
    }

    fn swap_interval_changed(&mut self, swap_interval: u32) {
        tracing::info!("swap interval is now {swap_interval}");
    }
}

fn print_histogram(name: &str, histogram: &FrameHistogram) {
    println!("    {name:<10} {:?}", histogram.buckets());
}

fn main() {
    #[cfg(feature = "profile")]
    tracing::subscriber::set_global_default(
        tracing_subscriber::registry().with(tracing_tracy::TracyLayer::new()),
    )
    .expect("set up the subscriber");

    #[cfg(not(feature = "profile"))]
    tracing_subscriber::fmt::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let platform = Arc::new(SimulatedPlatform::display_60hz());
    platform.set_auto_timestamps(Some(AutoTimestamps {
        render_time: PresentPeriod::from_nanos(6_000_000),
    }));
    platform.set_clock_follows_waits(true);

    let mut controller = PacingController::new(platform.clone(), DISPLAY, PacingConfig::default())
        .expect("create the pacing controller");
    controller.add_tracer(Box::new(LogTracer));

    let swap_interval = controller
        .set_frame_time(Duration::from_secs(1) / 30)
        .expect("set the frame time");
    tracing::info!("30 FPS on 60 Hz needs swap interval {swap_interval}");

    for i in 0..FRAMES {
        controller.begin_frame();

        // Uneven CPU work, occasionally stalling for several frames.
        let work = if i % 50 == 49 {
            90_000_000
        } else {
            8_000_000 + (i % 7) as i64 * 2_000_000
        };
        platform.advance(PresentPeriod::from_nanos(work));

        let target = controller.end_frame(SURFACE);
        platform.swap_buffers(SURFACE);

        // Swapping blocks until the buffer is latched.
        if platform.now() < target {
            platform.set_now(target);
        }
    }

    let stats = controller.stats();
    println!(
        "after {} frames at swap interval {}:",
        stats.frame_number, stats.swap_interval
    );
    println!("    resolved   {}", stats.frames.total_frames);
    print_histogram("idle", &stats.frames.idle);
    print_histogram("late", &stats.frames.late);
    print_histogram("offset", &stats.frames.offset_from_previous);
    print_histogram("latency", &stats.frames.latency);
    println!("    cpu        {:?}", stats.average.cpu);
    println!("    gpu        {:?}", stats.average.gpu);

    controller.shutdown();
}
