//! Presentation ports
//!
//! The trigger machinery never touches a display directly. It talks to a
//! [`PresentationPort`] (item layer, overlay layer, countdown readout) and
//! an [`AudioPort`] (alert sound). Each async operation resolves once its
//! transition has fully completed, and may fail with a
//! [`PresentationError`].
//!
//! [`ConsolePresenter`] renders onto the JSONL frame stream; tests swap in a
//! recording double.

pub mod audio;
pub mod console;
#[cfg(test)]
pub(crate) mod testing;

pub use audio::AlertSound;
pub use console::ConsolePresenter;

use crate::error::PresentationError;

/// Result type alias for presentation operations.
pub type Result<T> = std::result::Result<T, PresentationError>;

/// Visual surface of the widget.
#[async_trait::async_trait]
pub trait PresentationPort: Send + Sync {
    /// Fades out and removes the overlay. Resolves immediately when there
    /// is none.
    async fn clear_overlay(&self) -> Result<()>;

    /// Replaces any overlay with `text`, fading the old one out and the
    /// new one in.
    async fn show_overlay(&self, text: &str) -> Result<()>;

    /// Replaces the current item with `item`.
    ///
    /// Fails with [`PresentationError::LoadFailed`] when the item cannot be
    /// loaded; the previous item is gone by then.
    async fn display_item(&self, item: &str) -> Result<()>;

    /// Shows a new countdown readout. Synchronous and infallible.
    fn update_countdown(&self, _display: &str) {}
}

/// Alert sound output. Fire-and-forget.
pub trait AudioPort: Send + Sync {
    /// Starts playback; never waits for it to finish.
    fn play(&self);
}
