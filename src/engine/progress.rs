//! Progress reporting: an atomic job counter with throttled threshold emits,
//! plus an optional kdam bar.

use kdam::{Animation, Bar, BarExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::utils::config::ProgressConsts;

// Progress bar type alias
pub type ProgressBar = Arc<Mutex<Bar>>;

/// Create the batch progress bar. Returns None when disabled.
pub fn create_progress_bar(total: usize, no_progress: bool) -> Option<ProgressBar> {
    (!no_progress).then(|| {
        Arc::new(Mutex::new(kdam::tqdm!(
            total = total,
            desc = "Converting",
            animation = Animation::Classic
        )))
    })
}

/// Update progress bar if available.
/// Uses try_lock to avoid blocking parallel workers; if the lock is
/// contended the bar catches up on the next update.
pub fn update_progress_bar(pb: &ProgressBar, n: usize) {
    if let Ok(mut pb) = pb.try_lock() {
        let _ = pb.update(n);
    }
}

/// Monotonic completed-job counter with percentage-threshold emits.
///
/// [`record`](Self::record) is called once per completed job from any worker.
/// It returns `Some((done, percent))` exactly when a new 5% threshold is
/// crossed, and always for the final job. The last-emitted threshold advances
/// by compare-and-swap, so concurrent completions never produce duplicate or
/// backwards reports and no lock is taken on the hot path.
pub struct ProgressTracker {
    total: usize,
    done: AtomicUsize,
    last_percent: AtomicUsize,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            done: AtomicUsize::new(0),
            last_percent: AtomicUsize::new(0),
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn done(&self) -> usize {
        self.done.load(Ordering::Acquire)
    }

    /// Count one completed job. Returns the (done, percent) pair to report
    /// when this completion crossed a new threshold, None otherwise.
    pub fn record(&self) -> Option<(usize, usize)> {
        let done = self.done.fetch_add(1, Ordering::AcqRel) + 1;
        let percent = done * 100 / self.total.max(1);
        let step = ProgressConsts::STEP_PERCENT;
        // The final job always reports 100; intermediate jobs report the
        // step-rounded percentage they reached.
        let threshold = if done >= self.total {
            100
        } else {
            percent - percent % step
        };
        let mut last = self.last_percent.load(Ordering::Acquire);
        while threshold > last {
            match self.last_percent.compare_exchange(
                last,
                threshold,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Some((done, threshold)),
                Err(current) => last = current,
            }
        }
        None
    }
}
