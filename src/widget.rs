//! Widget runtime.
//!
//! The [`Widget`] wires the countdown, sampler, trigger machine, and
//! presentation ports together and runs the event loop: inbound chat and
//! button events on one side, tick events on the other, both funnelled
//! through the busy flag before anything is executed.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::{Action, Interpreter, TimerAction};
use crate::config::WidgetConfig;
use crate::error::{CarouselError, Result};
use crate::input::{InboundEvent, InputSource};
use crate::observability::metrics;
use crate::observability::{Event, EventEmitter};
use crate::phase::{Phase, TriggerMode, TriggerStateMachine};
use crate::pool::PoolSampler;
use crate::presentation::{AudioPort, PresentationPort};
use crate::scheduler::{Scheduler, TickEvent};
use crate::timer::CountdownTimer;

/// Everything [`Widget::new`] needs.
pub struct WidgetOptions {
    /// Frozen configuration.
    pub config: Arc<WidgetConfig>,
    /// Visual surface.
    pub presentation: Arc<dyn PresentationPort>,
    /// Alert sound.
    pub audio: Arc<dyn AudioPort>,
    /// Lifecycle frames (`WidgetStarted` / `WidgetStopped`).
    pub event_emitter: Arc<EventEmitter>,
    /// Token for cooperative shutdown.
    pub cancel: CancellationToken,
}

/// A sequence spawned by [`Widget::dispatch`].
pub type Sequence = JoinHandle<Result<()>>;

/// Widget runtime.
pub struct Widget {
    config: Arc<WidgetConfig>,
    scheduler: Arc<Scheduler>,
    machine: TriggerStateMachine,
    presentation: Arc<dyn PresentationPort>,
    interpreter: Interpreter,
    event_emitter: Arc<EventEmitter>,
    ticks: Mutex<Option<mpsc::UnboundedReceiver<TickEvent>>>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for Widget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Widget")
            .field("name", &self.config.widget.name)
            .field("scheduler", &self.scheduler)
            .field("machine", &self.machine)
            .finish_non_exhaustive()
    }
}

impl Widget {
    /// Builds the runtime from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CarouselError::Pool`] if the pool cannot back the
    /// configured sampling policy.
    pub fn new(opts: WidgetOptions) -> Result<Arc<Self>> {
        let config = opts.config;

        let items = config.pool.items.clone();
        let policy = config.pool.policy();
        let sampler = match config.pool.seed {
            Some(seed) => PoolSampler::seeded(items, policy, seed)?,
            None => PoolSampler::new(items, policy)?,
        };
        let pool_len = sampler.len();

        let timer =
            CountdownTimer::with_minutes(config.timer.interval_minutes, config.timer.unit_format());
        let (scheduler, ticks) = Scheduler::new(
            timer,
            Arc::clone(&opts.presentation),
            config.timer.tick,
            opts.cancel.child_token(),
        );
        let scheduler = Arc::new(scheduler);

        let machine = TriggerStateMachine::new(
            TriggerMode::from_two_phase(config.trigger.two_phase),
            config.trigger.alert_text.clone(),
            sampler,
            Arc::clone(&scheduler),
            Arc::clone(&opts.presentation),
            opts.audio,
        );

        Ok(Arc::new(Self {
            interpreter: Interpreter::new(&config.command.phrase, pool_len),
            config,
            scheduler,
            machine,
            presentation: opts.presentation,
            event_emitter: opts.event_emitter,
            ticks: Mutex::new(Some(ticks)),
            cancel: opts.cancel,
        }))
    }

    /// Shared scheduling state.
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Current trigger phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Starts the widget and processes events until `input` is exhausted or
    /// the cancel token fires.
    ///
    /// A sequence still in flight at that point is allowed to finish. The
    /// tick source is always stopped before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if the input source fails.
    pub async fn run<I: InputSource>(self: Arc<Self>, mut input: I) -> Result<()> {
        let taken = self
            .ticks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(mut ticks) = taken else {
            warn!("widget is already running");
            return Ok(());
        };

        self.start().await;

        let mut in_flight: Option<Sequence> = None;
        let result = loop {
            let spawned = tokio::select! {
                () = self.cancel.cancelled() => {
                    info!("widget cancelled");
                    break Ok("cancelled");
                }
                Some(event) = ticks.recv() => self.on_tick(event),
                next = input.next_event() => match next {
                    Ok(Some(event)) => self.on_input(&event),
                    Ok(None) => {
                        debug!("input closed, shutting down");
                        break Ok("EOF");
                    }
                    Err(e) => break Err(CarouselError::Io(e)),
                },
            };
            if spawned.is_some() {
                in_flight = spawned;
            }
        };

        if let Some(sequence) = in_flight {
            // The result was already logged by the sequence itself.
            let _ = sequence.await;
        }
        self.shutdown(match &result {
            Ok(reason) => (*reason).to_string(),
            Err(e) => format!("error: {e}"),
        });

        result.map(|_| ())
    }

    /// Shows the first item, applies `start_paused`, and starts ticking.
    ///
    /// Holds the busy flag throughout so no trigger can interleave.
    pub async fn start(&self) {
        let guard = self.scheduler.try_acquire();
        if guard.is_none() {
            warn!("startup raced with a sequence");
        }

        if let Err(e) = self.machine.show_initial().await {
            warn!(error = %e, "initial item failed to load");
            metrics::record_presentation_failure();
        }

        if self.config.timer.start_paused {
            if let Err(e) = self.pause().await {
                warn!(error = %e, "paused overlay failed");
            }
        }

        self.scheduler.publish_countdown();
        self.scheduler.start();
        drop(guard);

        self.event_emitter.emit(Event::WidgetStarted {
            timestamp: Utc::now(),
            widget_name: self.config.widget.name.clone(),
            pool_size: self.machine.pool_len(),
            mode: self.machine.mode().as_str().to_string(),
        });
        info!(
            name = %self.config.widget.name,
            mode = self.machine.mode().as_str(),
            countdown = %self.scheduler.countdown(),
            "widget started"
        );
    }

    /// Stops the tick source for good and reports the stop.
    pub fn shutdown(&self, reason: String) {
        self.scheduler.shutdown();
        info!(%reason, "widget stopped");
        self.event_emitter.emit(Event::WidgetStopped {
            timestamp: Utc::now(),
            reason,
        });
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    fn on_tick(self: &Arc<Self>, event: TickEvent) -> Option<Sequence> {
        match event {
            TickEvent::GoalReached => {
                if !self.scheduler.has_reached_goal() {
                    debug!("stale goal event ignored");
                    return None;
                }
                self.dispatch(Action::Release, "tick")
            }
        }
    }

    fn on_input(self: &Arc<Self>, event: &InboundEvent) -> Option<Sequence> {
        let action = match event {
            InboundEvent::Message { text } => self.interpreter.interpret_message(text),
            InboundEvent::Button { field } => self.interpreter.interpret_button(field),
        }?;
        metrics::record_command(action.label());
        self.dispatch(action, "input")
    }

    /// Runs `action` as a background sequence if no other sequence is in
    /// flight; otherwise drops it and returns `None`.
    ///
    /// The busy flag is held until the returned task completes, whatever
    /// its outcome.
    pub fn dispatch(self: &Arc<Self>, action: Action, source: &'static str) -> Option<Sequence> {
        let Some(guard) = self.scheduler.try_acquire() else {
            debug!(%action, source, "sequence in flight, dropping");
            metrics::record_trigger_dropped(source);
            return None;
        };
        debug!(%action, source, "dispatching");

        let widget = Arc::clone(self);
        Some(tokio::spawn(async move {
            let _guard = guard;
            let started = Instant::now();
            let result = widget.execute(action).await;
            metrics::record_sequence_duration(action.label(), started.elapsed());
            if let Err(e) = &result {
                warn!(%action, error = %e, "sequence failed");
                if matches!(e, CarouselError::Presentation(_)) {
                    metrics::record_presentation_failure();
                }
            }
            result
        }))
    }

    async fn execute(&self, action: Action) -> Result<()> {
        match action {
            Action::Trigger(selector) => {
                self.machine.fire(selector).await?;
            }
            Action::Release => {
                self.machine.release().await?;
            }
            Action::Timer(timer) => self.execute_timer(timer).await?,
        }
        Ok(())
    }

    async fn execute_timer(&self, action: TimerAction) -> Result<()> {
        match action {
            TimerAction::Pause => self.pause().await,
            TimerAction::Resume => self.resume().await,
            TimerAction::TogglePause => {
                if self.scheduler.is_paused() {
                    self.resume().await
                } else {
                    self.pause().await
                }
            }
            TimerAction::Reset => self.reset().await,
            TimerAction::Set(value) => {
                self.scheduler.set_time(value);
                info!(countdown = %value, "countdown set");
                Ok(())
            }
        }
    }

    async fn pause(&self) -> Result<()> {
        if self.scheduler.pause() {
            self.presentation
                .show_overlay(&self.config.trigger.paused_text)
                .await?;
        }
        Ok(())
    }

    async fn resume(&self) -> Result<()> {
        if self.scheduler.resume() {
            self.presentation.clear_overlay().await?;
        }
        Ok(())
    }

    /// Restores the countdown and discards a pending reveal.
    async fn reset(&self) -> Result<()> {
        self.scheduler.reset_timer();
        if self.machine.reset_phase() == Phase::AwaitingReveal {
            info!("pending reveal discarded");
            self.presentation.clear_overlay().await?;
            if self.scheduler.is_paused() {
                self.presentation
                    .show_overlay(&self.config.trigger.paused_text)
                    .await?;
            }
            self.scheduler.rearm();
        }
        Ok(())
    }
}
