//! Busy flags for in-flight requests.
//!
//! A `LoadingGuard` raises its flag when created and lowers it when dropped,
//! so the flag resets on success, on error, and when the request future is
//! cancelled.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Shared "request in flight" indicator.
#[derive(Debug, Clone, Default)]
pub struct LoadingFlag(Arc<AtomicBool>);

impl LoadingFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Raise the flag. Returns `None` when a request is already in flight.
    pub fn begin(&self) -> Option<LoadingGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(LoadingGuard {
            flag: Arc::clone(&self.0),
            started: Instant::now(),
        })
    }
}

#[derive(Debug)]
#[must_use = "the flag is lowered as soon as the guard is dropped"]
pub struct LoadingGuard {
    flag: Arc<AtomicBool>,
    started: Instant,
}

impl LoadingGuard {
    /// Time since the request started, for progress display.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_lowers_flag_on_drop() {
        let flag = LoadingFlag::new();
        {
            let _guard = flag.begin().unwrap();
            assert!(flag.is_loading());
            assert!(flag.begin().is_none());
        }
        assert!(!flag.is_loading());
        assert!(flag.begin().is_some());
    }

    #[test]
    fn guard_lowers_flag_on_error_path() {
        let flag = LoadingFlag::new();
        let run = |flag: &LoadingFlag| -> Result<(), &'static str> {
            let _guard = flag.begin().ok_or("busy")?;
            Err("upstream failed")
        };
        assert_eq!(run(&flag), Err("upstream failed"));
        assert!(!flag.is_loading());
    }

    #[test]
    fn clones_share_state() {
        let flag = LoadingFlag::new();
        let observer = flag.clone();
        let guard = flag.begin().unwrap();
        assert!(observer.is_loading());
        drop(guard);
        assert!(!observer.is_loading());
    }
}
