//! Shared scheduling state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::busy::{BusyFlag, BusyGuard};
use super::ticker::{TickEvent, Ticker};
use crate::observability::metrics;
use crate::presentation::PresentationPort;
use crate::timer::{CountdownTimer, TimeValue};

/// Shortest period the tick source accepts.
const MIN_PERIOD: Duration = Duration::from_millis(1);

struct RunningTicker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Countdown, flags, and tick source shared by the trigger machinery.
///
/// All methods take `&self`; the scheduler is meant to live in an `Arc`.
pub struct Scheduler {
    timer: Arc<Mutex<CountdownTimer>>,
    presentation: Arc<dyn PresentationPort>,
    period: Duration,
    paused: Arc<AtomicBool>,
    busy: BusyFlag,
    ticker: Mutex<Option<RunningTicker>>,
    events: mpsc::UnboundedSender<TickEvent>,
    shutdown: CancellationToken,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("countdown", &self.countdown())
            .field("period", &self.period)
            .field("paused", &self.is_paused())
            .field("busy", &self.busy.is_busy())
            .field("ticking", &self.is_ticking())
            .finish_non_exhaustive()
    }
}

impl Scheduler {
    /// Creates a scheduler and the receiver for its tick events.
    ///
    /// Tick tasks run as children of `shutdown`: cancelling it stops every
    /// tick source for good.
    #[must_use]
    pub fn new(
        timer: CountdownTimer,
        presentation: Arc<dyn PresentationPort>,
        period: Duration,
        shutdown: CancellationToken,
    ) -> (Self, mpsc::UnboundedReceiver<TickEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            timer: Arc::new(Mutex::new(timer)),
            presentation,
            period: period.max(MIN_PERIOD),
            paused: Arc::new(AtomicBool::new(false)),
            busy: BusyFlag::new(),
            ticker: Mutex::new(None),
            events,
            shutdown,
        };
        (scheduler, rx)
    }

    // ========================================================================
    // Tick source
    // ========================================================================

    /// Starts the tick source.
    ///
    /// Returns `false` without spawning when the countdown is not
    /// activated, a tick source is already running, or shutdown has begun.
    pub fn start(&self) -> bool {
        if !lock_timer(&self.timer).is_activated() {
            debug!("countdown not activated, tick source stays idle");
            return false;
        }
        if self.shutdown.is_cancelled() {
            return false;
        }

        let mut slot = lock(&self.ticker);
        if slot.as_ref().is_some_and(|t| !t.handle.is_finished()) {
            return false;
        }

        let cancel = self.shutdown.child_token();
        let ticker = Ticker {
            timer: Arc::clone(&self.timer),
            presentation: Arc::clone(&self.presentation),
            paused: Arc::clone(&self.paused),
            events: self.events.clone(),
        };
        let handle = tokio::spawn(ticker.run(self.period, cancel.clone()));
        *slot = Some(RunningTicker { cancel, handle });
        debug!(period = ?self.period, "tick source started");
        true
    }

    /// Stops the tick source. Returns `false` if none was running.
    pub fn halt(&self) -> bool {
        let Some(running) = lock(&self.ticker).take() else {
            return false;
        };
        running.cancel.cancel();
        debug!("tick source halted");
        !running.handle.is_finished()
    }

    /// Replaces the tick source with a fresh one whose first tick is a full
    /// period away.
    pub fn rearm(&self) -> bool {
        self.halt();
        self.start()
    }

    /// Returns `true` while a tick source is running.
    #[must_use]
    pub fn is_ticking(&self) -> bool {
        lock(&self.ticker)
            .as_ref()
            .is_some_and(|t| !t.handle.is_finished())
    }

    /// Stops the tick source and prevents any new one from starting.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.halt();
    }

    // ========================================================================
    // Flags
    // ========================================================================

    /// Claims the busy flag for one sequence.
    #[must_use]
    pub fn try_acquire(&self) -> Option<BusyGuard> {
        self.busy.try_acquire()
    }

    /// Returns `true` while a sequence holds the busy flag.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Suspends countdown ticks. Returns `false` if already paused.
    pub fn pause(&self) -> bool {
        let changed = !self.paused.swap(true, Ordering::SeqCst);
        if changed {
            info!("countdown paused");
            metrics::set_paused(true);
        }
        changed
    }

    /// Resumes countdown ticks. Returns `false` if not paused.
    pub fn resume(&self) -> bool {
        let changed = self.paused.swap(false, Ordering::SeqCst);
        if changed {
            info!("countdown resumed");
            metrics::set_paused(false);
        }
        changed
    }

    /// Returns `true` while ticks are being ignored.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    // ========================================================================
    // Countdown
    // ========================================================================

    /// Restores the configured duration and publishes the readout.
    pub fn reset_timer(&self) {
        let display = {
            let mut timer = lock_timer(&self.timer);
            timer.reset();
            timer.display()
        };
        self.presentation.update_countdown(&display);
    }

    /// Overwrites the running countdown and publishes the readout.
    ///
    /// The configured duration used by [`reset_timer`](Self::reset_timer) is
    /// left alone.
    pub fn set_time(&self, value: TimeValue) {
        let display = {
            let mut timer = lock_timer(&self.timer);
            timer.set_time(value);
            timer.display()
        };
        self.presentation.update_countdown(&display);
    }

    /// Publishes the current readout.
    pub fn publish_countdown(&self) {
        let display = lock_timer(&self.timer).display();
        self.presentation.update_countdown(&display);
    }

    /// Returns `true` when the countdown is at zero.
    #[must_use]
    pub fn has_reached_goal(&self) -> bool {
        lock_timer(&self.timer).has_reached_goal()
    }

    /// Running countdown value.
    #[must_use]
    pub fn countdown(&self) -> TimeValue {
        lock_timer(&self.timer).current()
    }

    /// Returns `true` if a non-zero duration is configured.
    #[must_use]
    pub fn is_activated(&self) -> bool {
        lock_timer(&self.timer).is_activated()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        let slot = self.ticker.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(running) = slot.take() {
            running.cancel.cancel();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(super) fn lock_timer(timer: &Mutex<CountdownTimer>) -> MutexGuard<'_, CountdownTimer> {
    lock(timer)
}
