//! Alert sound.

use std::sync::Arc;

use chrono::Utc;

use super::AudioPort;
use crate::observability::{Event, EventEmitter};

/// Alert sound announced on the frame stream.
///
/// Without a configured source, [`play`](AudioPort::play) does nothing.
#[derive(Debug)]
pub struct AlertSound {
    source: Option<String>,
    volume: f32,
    emitter: Arc<EventEmitter>,
}

impl AlertSound {
    /// Creates an alert for `source` at a volume given in percent.
    ///
    /// Volumes above 100 are capped.
    #[must_use]
    pub fn new(source: Option<String>, volume_percent: u8, emitter: Arc<EventEmitter>) -> Self {
        Self {
            source,
            volume: f32::from(volume_percent.min(100)) / 100.0,
            emitter,
        }
    }

    /// Creates an alert with no sound source.
    #[must_use]
    pub const fn silent(emitter: Arc<EventEmitter>) -> Self {
        Self {
            source: None,
            volume: 0.0,
            emitter,
        }
    }

    /// Playback volume in `0.0..=1.0`.
    #[must_use]
    pub const fn volume(&self) -> f32 {
        self.volume
    }
}

impl AudioPort for AlertSound {
    fn play(&self) {
        let Some(url) = &self.source else {
            tracing::trace!("no alert sound configured");
            return;
        };
        tracing::debug!(%url, volume = self.volume, "playing alert");
        self.emitter.emit(Event::AlertPlayed {
            timestamp: Utc::now(),
            url: url.clone(),
            volume: self.volume,
        });
    }
}
