//! Cooperative cancellation with an optional deadline.
//!
//! A token is checked once per lap.  Nothing is interrupted mid-lap; a
//! cancelled trial stops at the next lap boundary and reports what it had.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

/// Why a run stopped before its last lap.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopReason {
    Cancelled,
    TimedOut,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    deadline:  OnceLock<Instant>,
}

/// Shared cancellation flag plus a deadline that can be armed once.
///
/// Clones share state.  The scheduler keeps one clone in its job table and
/// hands another to the running job.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token whose deadline is already armed.
    pub fn with_timeout(timeout: Duration) -> Self {
        let token = Self::new();
        token.arm_deadline(timeout);
        token
    }

    /// Set the deadline to `now + timeout`.  Only the first call has an
    /// effect; returns whether this call armed it.
    pub fn arm_deadline(&self, timeout: Duration) -> bool {
        let at = Instant::now().checked_add(timeout);
        match at {
            Some(at) => self.inner.deadline.set(at).is_ok(),
            // Unrepresentable deadline: never expires.
            None => false,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline.get().copied()
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// `Some` once the run must stop.  Explicit cancellation wins over expiry.
    pub fn check(&self) -> Option<StopReason> {
        if self.is_cancelled() {
            return Some(StopReason::Cancelled);
        }
        match self.inner.deadline.get() {
            Some(&at) if Instant::now() >= at => Some(StopReason::TimedOut),
            _ => None,
        }
    }
}
