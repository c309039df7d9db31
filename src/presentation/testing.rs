//! Recording presentation double for unit tests.

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use super::{AudioPort, PresentationPort, Result};
use crate::error::PresentationError;

/// One observed port call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Alert,
    ClearOverlay,
    ShowOverlay(String),
    DisplayItem(String),
    Countdown(String),
}

/// Records every call on both ports, in order.
///
/// Async calls are recorded when issued and then sleep for `delay`, so a
/// sequence stays in flight for a predictable amount of (virtual) time.
#[derive(Debug, Default)]
pub(crate) struct Recorder {
    calls: Mutex<Vec<Call>>,
    delay: Duration,
    failing: Mutex<HashSet<String>>,
}

impl Recorder {
    pub(crate) fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub(crate) fn fail_item(&self, item: &str) {
        self.failing.lock().unwrap().insert(item.to_string());
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls other than countdown updates.
    pub(crate) fn visible_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::Countdown(_)))
            .collect()
    }

    pub(crate) fn countdowns(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Countdown(d) => Some(d),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn displayed(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::DisplayItem(i) => Some(i),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    async fn settle(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait::async_trait]
impl PresentationPort for Recorder {
    async fn clear_overlay(&self) -> Result<()> {
        self.record(Call::ClearOverlay);
        self.settle().await;
        Ok(())
    }

    async fn show_overlay(&self, text: &str) -> Result<()> {
        self.record(Call::ShowOverlay(text.to_string()));
        self.settle().await;
        Ok(())
    }

    async fn display_item(&self, item: &str) -> Result<()> {
        self.record(Call::DisplayItem(item.to_string()));
        self.settle().await;
        if self.failing.lock().unwrap().contains(item) {
            return Err(PresentationError::LoadFailed {
                item: item.to_string(),
                reason: "rejected by test".to_string(),
            });
        }
        Ok(())
    }

    fn update_countdown(&self, display: &str) {
        self.record(Call::Countdown(display.to_string()));
    }
}

impl AudioPort for Recorder {
    fn play(&self) {
        self.record(Call::Alert);
    }
}
