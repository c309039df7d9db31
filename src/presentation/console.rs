//! Frame-stream presenter.
//!
//! Models a two-layer surface (item layer under an overlay layer) and
//! writes every visible change to the [`EventEmitter`]. Fades are simulated
//! with `tokio::time::sleep`, so callers observe the same completion timing
//! a real renderer would give them.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;

use super::{PresentationPort, Result};
use crate::error::PresentationError;
use crate::observability::{Event, EventEmitter};

#[derive(Debug, Default)]
struct Surface {
    item: Option<String>,
    overlay: Option<String>,
}

/// Presenter that renders onto the JSONL frame stream.
#[derive(Debug)]
pub struct ConsolePresenter {
    emitter: Arc<EventEmitter>,
    fade: Duration,
    verify_local_items: bool,
    countdown_visible: bool,
    surface: Mutex<Surface>,
}

impl ConsolePresenter {
    /// Creates a presenter with the given fade length.
    #[must_use]
    pub fn new(emitter: Arc<EventEmitter>, fade: Duration) -> Self {
        Self {
            emitter,
            fade,
            verify_local_items: false,
            countdown_visible: true,
            surface: Mutex::new(Surface::default()),
        }
    }

    /// Fails `display_item` for local paths that do not exist.
    #[must_use]
    pub const fn with_local_verification(mut self, enabled: bool) -> Self {
        self.verify_local_items = enabled;
        self
    }

    /// Suppresses countdown frames when `visible` is `false`.
    #[must_use]
    pub const fn with_countdown_visible(mut self, visible: bool) -> Self {
        self.countdown_visible = visible;
        self
    }

    /// Item currently on the item layer.
    #[must_use]
    pub fn current_item(&self) -> Option<String> {
        self.lock().item.clone()
    }

    /// Text currently on the overlay layer.
    #[must_use]
    pub fn current_overlay(&self) -> Option<String> {
        self.lock().overlay.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Surface> {
        // Surface updates are single assignments; a poisoned lock still
        // holds a consistent value.
        self.surface
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    async fn fade(&self) {
        if !self.fade.is_zero() {
            tokio::time::sleep(self.fade).await;
        }
    }

    async fn check_loadable(&self, item: &str) -> Result<()> {
        if !self.verify_local_items || !is_local(item) {
            return Ok(());
        }
        match tokio::fs::metadata(item).await {
            Ok(meta) if meta.is_file() => Ok(()),
            Ok(_) => Err(PresentationError::LoadFailed {
                item: item.to_string(),
                reason: "not a regular file".to_string(),
            }),
            Err(e) => Err(PresentationError::LoadFailed {
                item: item.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

#[async_trait::async_trait]
impl PresentationPort for ConsolePresenter {
    async fn clear_overlay(&self) -> Result<()> {
        if self.lock().overlay.is_none() {
            return Ok(());
        }
        self.fade().await;
        self.lock().overlay = None;
        self.emitter.emit(Event::OverlayCleared {
            timestamp: Utc::now(),
        });
        Ok(())
    }

    async fn show_overlay(&self, text: &str) -> Result<()> {
        self.clear_overlay().await?;
        self.lock().overlay = Some(text.to_string());
        self.emitter.emit(Event::OverlayShown {
            timestamp: Utc::now(),
            text: text.to_string(),
        });
        self.fade().await;
        Ok(())
    }

    async fn display_item(&self, item: &str) -> Result<()> {
        if self.lock().item.is_some() {
            self.fade().await;
            self.lock().item = None;
        }

        self.check_loadable(item).await?;

        self.lock().item = Some(item.to_string());
        self.emitter.emit(Event::ItemDisplayed {
            timestamp: Utc::now(),
            item: item.to_string(),
        });
        self.fade().await;
        Ok(())
    }

    fn update_countdown(&self, display: &str) {
        if self.countdown_visible {
            self.emitter.emit(Event::CountdownUpdated {
                timestamp: Utc::now(),
                display: display.to_string(),
            });
        }
    }
}

/// Items with a URL scheme are never checked on disk.
fn is_local(item: &str) -> bool {
    !item.contains("://") && !item.starts_with("data:") && !Path::new(item).as_os_str().is_empty()
}
