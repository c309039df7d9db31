//! Fire sequencing.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use super::state::{FireOutcome, Phase, Selector, TriggerMode};
use crate::error::{CarouselError, PoolError};
use crate::observability::metrics;
use crate::pool::PoolSampler;
use crate::presentation::{AudioPort, PresentationPort};
use crate::scheduler::Scheduler;

/// Sequences alert and reveal steps over the presentation ports.
///
/// The machine does not guard against reentrancy; callers hold the
/// scheduler's busy flag for the duration of [`fire`](Self::fire).
pub struct TriggerStateMachine {
    mode: TriggerMode,
    phase: Mutex<Phase>,
    alert_text: String,
    sampler: Mutex<PoolSampler>,
    scheduler: Arc<Scheduler>,
    presentation: Arc<dyn PresentationPort>,
    audio: Arc<dyn AudioPort>,
}

impl std::fmt::Debug for TriggerStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerStateMachine")
            .field("mode", &self.mode)
            .field("phase", &self.phase())
            .field("alert_text", &self.alert_text)
            .finish_non_exhaustive()
    }
}

impl TriggerStateMachine {
    /// Creates an idle machine.
    #[must_use]
    pub fn new(
        mode: TriggerMode,
        alert_text: impl Into<String>,
        sampler: PoolSampler,
        scheduler: Arc<Scheduler>,
        presentation: Arc<dyn PresentationPort>,
        audio: Arc<dyn AudioPort>,
    ) -> Self {
        Self {
            mode,
            phase: Mutex::new(Phase::Idle),
            alert_text: alert_text.into(),
            sampler: Mutex::new(sampler),
            scheduler,
            presentation,
            audio,
        }
    }

    /// Configured mode.
    #[must_use]
    pub const fn mode(&self) -> TriggerMode {
        self.mode
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        *lock(&self.phase)
    }

    /// Number of items in the pool.
    #[must_use]
    pub fn pool_len(&self) -> usize {
        lock(&self.sampler).len()
    }

    /// Advances the machine by one step.
    ///
    /// - one-phase: alert, halt ticks, reveal, reset and rearm the countdown
    /// - two-phase, idle: alert, halt ticks, show the alert overlay
    /// - two-phase, awaiting reveal: reveal, reset and rearm the countdown
    ///
    /// A reveal clears the overlay and displays the selected item
    /// concurrently and waits for both.
    ///
    /// # Errors
    ///
    /// Returns [`CarouselError::Pool`] for an out-of-range index, before
    /// any side effect. Returns [`CarouselError::Presentation`] if a port
    /// rejects an operation; the cycle is still closed (countdown reset,
    /// ticks rearmed, phase back to idle) so the widget keeps rotating.
    pub async fn fire(&self, selector: Selector) -> Result<FireOutcome, CarouselError> {
        let phase = self.phase();
        metrics::record_fire(phase.as_str());

        if self.mode == TriggerMode::TwoPhase && phase == Phase::Idle {
            return self.alert().await;
        }

        let item = self.select(selector)?;
        if self.mode == TriggerMode::OnePhase {
            self.audio.play();
            self.scheduler.halt();
        }
        self.reveal(item).await
    }

    /// Timer-driven fire with a random selection.
    ///
    /// # Errors
    ///
    /// Same as [`fire`](Self::fire).
    pub async fn release(&self) -> Result<FireOutcome, CarouselError> {
        self.fire(Selector::Random).await
    }

    /// Forces the phase back to idle and returns the phase it replaced.
    ///
    /// Presentation and scheduling are left to the caller.
    pub fn reset_phase(&self) -> Phase {
        let previous = std::mem::take(&mut *lock(&self.phase));
        if previous != Phase::Idle {
            debug!(from = %previous, "phase reset");
        }
        previous
    }

    /// Displays a random item without any alert or timer side effects.
    ///
    /// # Errors
    ///
    /// Returns [`CarouselError::Presentation`] if the item fails to load.
    pub async fn show_initial(&self) -> Result<String, CarouselError> {
        let item = lock(&self.sampler).pick();
        self.presentation.display_item(&item).await?;
        info!(%item, "initial item displayed");
        Ok(item)
    }

    fn select(&self, selector: Selector) -> Result<String, PoolError> {
        let mut sampler = lock(&self.sampler);
        match selector {
            Selector::Random => Ok(sampler.pick()),
            Selector::Index(index) => sampler.pick_at(index),
        }
    }

    async fn alert(&self) -> Result<FireOutcome, CarouselError> {
        self.audio.play();
        self.scheduler.halt();
        let shown = self.presentation.show_overlay(&self.alert_text).await;
        // The reveal must stay reachable even if the overlay failed.
        self.set_phase(Phase::AwaitingReveal);
        shown?;
        info!("alert shown, awaiting reveal");
        Ok(FireOutcome::Alerted)
    }

    async fn reveal(&self, item: String) -> Result<FireOutcome, CarouselError> {
        let (cleared, displayed) = tokio::join!(
            self.presentation.clear_overlay(),
            self.presentation.display_item(&item),
        );

        self.scheduler.reset_timer();
        self.scheduler.resume();
        self.scheduler.rearm();
        self.set_phase(Phase::Idle);

        if let Err(e) = cleared.and(displayed) {
            warn!(%item, error = %e, "reveal failed");
            return Err(e.into());
        }

        metrics::record_reveal();
        info!(%item, "item revealed");
        Ok(FireOutcome::Revealed(item))
    }

    fn set_phase(&self, next: Phase) {
        let previous = std::mem::replace(&mut *lock(&self.phase), next);
        if previous != next {
            debug!(from = %previous, to = %next, "phase changed");
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
