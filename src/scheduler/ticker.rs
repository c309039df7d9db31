//! Tick source task.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::context::lock_timer;
use crate::presentation::PresentationPort;
use crate::timer::CountdownTimer;

/// Notification sent by the tick source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    /// A tick found the countdown at zero.
    GoalReached,
}

/// State one tick source instance works on.
pub(super) struct Ticker {
    pub(super) timer: Arc<Mutex<CountdownTimer>>,
    pub(super) presentation: Arc<dyn PresentationPort>,
    pub(super) paused: Arc<AtomicBool>,
    pub(super) events: mpsc::UnboundedSender<TickEvent>,
}

impl Ticker {
    /// Ticks every `period` until `cancel` fires. The first tick is one
    /// full period after the call.
    pub(super) async fn run(self, period: Duration, cancel: CancellationToken) {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!("tick source stopped");
                    break;
                }
                _ = interval.tick() => {
                    if !self.tick() {
                        debug!("tick receiver gone, stopping tick source");
                        break;
                    }
                }
            }
        }
    }

    /// Handles one tick. Returns `false` once nobody listens for events.
    fn tick(&self) -> bool {
        if self.paused.load(Ordering::SeqCst) {
            trace!("tick ignored while paused");
            return true;
        }

        let advanced = {
            let mut timer = lock_timer(&self.timer);
            timer.decrease().then(|| timer.display())
        };

        match advanced {
            Some(display) => {
                self.presentation.update_countdown(&display);
                true
            }
            None => self.events.send(TickEvent::GoalReached).is_ok(),
        }
    }
}
