//! Single-shot scoped timer: a cancellation token standing in for the
//! original SIGALRM + shared-flag idiom (spec.md / SPEC_FULL.md §9).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// A one-shot timer observed by polling `is_expired`. Letting it run to
/// completion after the caller has already stopped watching it is harmless:
/// it owns no I/O and cannot corrupt anything other than its own flag.
pub struct Timer {
    expired: Arc<AtomicBool>,
}

impl Timer {
    /// Arms a timer that flips `is_expired` to `true` after `duration`.
    pub fn arm(duration: Duration) -> Self {
        let expired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&expired);
        thread::spawn(move || {
            thread::sleep(duration);
            flag.store(true, Ordering::Relaxed);
        });
        Timer { expired }
    }

    /// A timer that never expires, for callers that should wait forever
    /// (e.g. a receiver waiting for `SET`).
    pub fn never() -> Self {
        Timer {
            expired: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether the armed duration has elapsed. Always `false` for `never()`.
    pub fn is_expired(&self) -> bool {
        self.expired.load(Ordering::Relaxed)
    }
}
