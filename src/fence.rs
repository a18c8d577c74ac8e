//! Off-thread GPU fence waiting.
//!
//! Blocking on a fence tells us when the GPU finished a frame, but doing that
//! on the render thread would serialize CPU and GPU work. The [`FenceWaiter`]
//! owns a background thread that waits on the most recently created fence and
//! records how long the wait took, so the render thread only blocks when it
//! actually needs the GPU to have caught up.
//!
//! There is a single fence slot. A fence handed over while the previous one is
//! still being waited on replaces it; the background thread finishes its
//! current wait and then moves on to the newest fence. Replaced fences stay
//! with their creator.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    thread::JoinHandle,
    time::Duration,
};

use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::{
    platform::{DisplayHandle, FenceHandle, FenceStatus, FenceWait, Platform},
    time::PresentTime,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FenceRecord {
    pub display: DisplayHandle,
    pub fence: FenceHandle,
    pub created: PresentTime,
}

struct State {
    record: Option<FenceRecord>,
    /// Incremented for every new record so the background thread can tell
    /// whether the record it waited on has been replaced in the meantime.
    generation: u64,
    pending: bool,
    /// Set when the last wait timed out or failed and the background thread
    /// destroyed the fence.
    abandoned: bool,
    running: bool,
}

struct Shared {
    state: Mutex<State>,
    condvar: Condvar,
    pending_time_ns: AtomicU64,
    timeout_ns: AtomicU64,
}

/// Lifetime control object for the fence waiting thread. Dropping it stops and
/// joins the thread.
pub struct FenceWaiter {
    shared: Arc<Shared>,
    joiner: Option<JoinHandle<()>>,
}

impl FenceWaiter {
    pub fn new<P: Platform>(platform: Arc<P>, timeout: Duration) -> std::io::Result<Self> {
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                record: None,
                generation: 0,
                pending: false,
                abandoned: false,
                running: true,
            }),
            condvar: Condvar::new(),
            pending_time_ns: AtomicU64::new(0),
            timeout_ns: AtomicU64::new(duration_to_nanos(timeout)),
        });

        let thread_shared = shared.clone();
        let joiner = std::thread::Builder::new()
            .name("fence-waiter".to_owned())
            .spawn(move || thread_main(platform.as_ref(), &thread_shared))?;

        Ok(Self {
            shared,
            joiner: Some(joiner),
        })
    }

    /// Hands a freshly created fence to the background thread. Any record that
    /// has not been waited on yet is replaced.
    ///
    /// The waiter only destroys the current fence, and only when its wait
    /// times out or fails. A replaced fence is never destroyed here; the
    /// caller still owns it.
    pub fn on_fence_created(
        &self,
        display: DisplayHandle,
        fence: FenceHandle,
        created: PresentTime,
    ) {
        let mut state = self.shared.state.lock();

        if state.pending {
            if let Some(previous) = state.record {
                tracing::debug!(?previous, "fence superseded before its wait completed");
            }
        }

        state.record = Some(FenceRecord {
            display,
            fence,
            created,
        });
        state.generation += 1;
        state.pending = true;
        state.abandoned = false;

        self.shared.condvar.notify_all();
    }

    /// Blocks until the background thread has finished with the most recent
    /// fence.
    ///
    /// Returns `true` if the GPU is known to have caught up: either no fence
    /// was ever created or the last one signalled. Returns `false` if the last
    /// wait timed out or failed, in which case the fence has already been
    /// destroyed.
    pub fn wait_for_idle(&self) -> bool {
        !self.wait_idle_locked().abandoned
    }

    /// Checks, without blocking, whether the GPU has caught up with the most
    /// recent fence.
    pub fn poll<P: Platform>(&self, platform: &P) -> FenceStatus {
        let state = self.shared.state.lock();
        match state.record {
            Some(record) if state.pending => platform.fence_status(record.display, record.fence),
            // Either nothing was submitted, the wait already finished, or the
            // fence was abandoned. There is nothing left to wait for.
            _ => FenceStatus::Signalled,
        }
    }

    /// Waits for the background thread to go idle and takes the last fence
    /// back from it, if it is still alive. The caller becomes responsible for
    /// destroying it.
    pub fn take_fence(&self) -> Option<FenceRecord> {
        let mut state = self.wait_idle_locked();
        state.record.take()
    }

    /// How long the last completed fence wait took. Lock-free; may describe a
    /// frame older than the most recent one.
    #[must_use]
    pub fn fence_pending_time(&self) -> Duration {
        Duration::from_nanos(self.shared.pending_time_ns.load(Ordering::Relaxed))
    }

    /// A handle for reading the last fence wait duration from another thread.
    pub(crate) fn pending_time_source(&self) -> PendingTimeSource {
        PendingTimeSource(self.shared.clone())
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_nanos(self.shared.timeout_ns.load(Ordering::Relaxed))
    }

    /// Changes the timeout used for every subsequent fence wait.
    pub fn set_timeout(&self, timeout: Duration) {
        self.shared
            .timeout_ns
            .store(duration_to_nanos(timeout), Ordering::Relaxed);
    }

    /// Stops the background thread and waits for it to exit. An in-flight
    /// fence wait is not interrupted; it ends at the latest when its timeout
    /// expires.
    pub fn stop(&mut self) {
        let Some(joiner) = self.joiner.take() else {
            return;
        };

        {
            let mut state = self.shared.state.lock();
            state.running = false;
            state.pending = false;
            self.shared.condvar.notify_all();
        }

        if joiner.join().is_err() {
            tracing::error!("The fence waiter thread panicked.");
        }
    }

    fn wait_idle_locked(&self) -> MutexGuard<'_, State> {
        let mut state = self.shared.state.lock();
        while state.pending {
            self.shared.condvar.wait(&mut state);
        }
        state
    }
}

impl Drop for FenceWaiter {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Read side of the last fence wait duration.
#[derive(Clone)]
pub(crate) struct PendingTimeSource(Arc<Shared>);

impl PendingTimeSource {
    pub fn get(&self) -> Duration {
        Duration::from_nanos(self.0.pending_time_ns.load(Ordering::Relaxed))
    }
}

fn thread_main<P: Platform>(platform: &P, shared: &Shared) {
    let mut state = shared.state.lock();

    loop {
        while !state.pending && state.running {
            shared.condvar.wait(&mut state);
        }

        if !state.running {
            break;
        }

        let Some(record) = state.record else {
            state.pending = false;
            shared.condvar.notify_all();
            continue;
        };

        let generation = state.generation;
        let timeout = Duration::from_nanos(shared.timeout_ns.load(Ordering::Relaxed));

        let (result, elapsed) = MutexGuard::unlocked(&mut state, || {
            #[cfg(feature = "profile")]
            let _s = tracing_tracy::client::span!("GPU frame time");

            let start = platform.now();
            let result = platform.wait_fence(record.display, record.fence, timeout);
            let elapsed = platform.now().saturating_duration_since(start);

            (result, elapsed)
        });

        shared
            .pending_time_ns
            .store(duration_to_nanos(elapsed), Ordering::Relaxed);

        if state.generation != generation {
            // A newer fence arrived during the wait and `pending` is still set
            // for it. The superseded fence belongs to whoever created it.
            if result != FenceWait::Signalled {
                tracing::debug!(?record, "Superseded fence did not signal.");
            }
            continue;
        }

        // Destroyed with the lock held so that `poll` never sees a dead handle.
        match result {
            FenceWait::Signalled => {}
            FenceWait::TimedOut => {
                let age = platform.now().saturating_duration_since(record.created);
                tracing::debug!(?timeout, ?age, "Timed out waiting for fence.");
                platform.destroy_fence(record.display, record.fence);
            }
            FenceWait::Error => {
                tracing::debug!("Failed to wait for fence.");
                platform.destroy_fence(record.display, record.fence);
            }
        }

        if result != FenceWait::Signalled {
            state.record = None;
            state.abandoned = true;
        }

        state.pending = false;
        shared.condvar.notify_all();
    }
}

fn duration_to_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}
