//! Reentrancy guard for trigger sequences.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared "a sequence is in flight" flag.
///
/// Clones observe the same flag. At most one [`BusyGuard`] exists at a time.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    /// Creates a free flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the flag, or returns `None` if a sequence already holds it.
    #[must_use]
    pub fn try_acquire(&self) -> Option<BusyGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(Arc::clone(&self.0)))
    }

    /// Returns `true` while a guard is alive.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Releases the [`BusyFlag`] when dropped, on success, error, or panic.
#[derive(Debug)]
#[must_use = "the flag is released as soon as the guard is dropped"]
pub struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_while_held() {
        let flag = BusyFlag::new();
        let guard = flag.try_acquire();
        assert!(guard.is_some());
        assert!(flag.is_busy());
        assert!(flag.try_acquire().is_none());
    }

    #[test]
    fn drop_releases() {
        let flag = BusyFlag::new();
        drop(flag.try_acquire());
        assert!(!flag.is_busy());
        assert!(flag.try_acquire().is_some());
    }

    #[test]
    fn clones_share_state() {
        let flag = BusyFlag::new();
        let other = flag.clone();
        let _guard = flag.try_acquire().unwrap();
        assert!(other.is_busy());
        assert!(other.try_acquire().is_none());
    }

    #[tokio::test]
    async fn guard_released_when_task_panics() {
        let flag = BusyFlag::new();
        let guard = flag.try_acquire().unwrap();
        let handle = tokio::spawn(async move {
            let _guard = guard;
            panic!("sequence blew up");
        });
        assert!(handle.await.is_err());
        assert!(!flag.is_busy());
    }
}
