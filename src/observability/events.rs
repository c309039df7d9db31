//! Presentation frame stream.
//!
//! Every visible change to the widget surface is written as one JSON line.
//! A renderer (browser source, terminal UI, test harness) tails the stream
//! and applies the frames in `sequence` order.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Frame variants
// ---------------------------------------------------------------------------

/// A single change to the widget surface.
///
/// Serialized with a `"type"` tag so renderers can dispatch on the kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The widget finished startup.
    WidgetStarted {
        /// When startup completed.
        timestamp: DateTime<Utc>,
        /// Configured widget name.
        widget_name: String,
        /// Number of items in the pool.
        pool_size: usize,
        /// `"one_phase"` or `"two_phase"`.
        mode: String,
    },

    /// The widget shut down.
    WidgetStopped {
        /// When shutdown happened.
        timestamp: DateTime<Utc>,
        /// Human-readable stop reason.
        reason: String,
    },

    /// An item replaced whatever was on the item layer.
    ItemDisplayed {
        /// When the item was attached.
        timestamp: DateTime<Utc>,
        /// Item identifier (path or URL).
        item: String,
    },

    /// Overlay text became visible.
    OverlayShown {
        /// When the overlay was attached.
        timestamp: DateTime<Utc>,
        /// Overlay text.
        text: String,
    },

    /// The overlay was removed.
    OverlayCleared {
        /// When the overlay was detached.
        timestamp: DateTime<Utc>,
    },

    /// The countdown readout changed.
    CountdownUpdated {
        /// When the readout changed.
        timestamp: DateTime<Utc>,
        /// Rendered readout, e.g. `"4:59"`.
        display: String,
    },

    /// The alert sound was started.
    AlertPlayed {
        /// When playback was requested.
        timestamp: DateTime<Utc>,
        /// Audio source.
        url: String,
        /// Playback volume in `0.0..=1.0`.
        volume: f32,
    },
}

impl Event {
    /// Returns the frame's type tag.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::WidgetStarted { .. } => "WidgetStarted",
            Self::WidgetStopped { .. } => "WidgetStopped",
            Self::ItemDisplayed { .. } => "ItemDisplayed",
            Self::OverlayShown { .. } => "OverlayShown",
            Self::OverlayCleared { .. } => "OverlayCleared",
            Self::CountdownUpdated { .. } => "CountdownUpdated",
            Self::AlertPlayed { .. } => "AlertPlayed",
        }
    }
}

/// Adds the sequence number to a frame without nesting it.
#[derive(Debug, Serialize)]
struct Envelope {
    sequence: u64,
    #[serde(flatten)]
    event: Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe JSONL frame writer.
///
/// The sequence counter is bumped under the writer lock, so line order and
/// sequence order always agree. Write failures are dropped.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter over an arbitrary writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that writes to stdout, the default frame sink.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Creates an emitter that discards every frame.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Creates an emitter that writes to a fresh file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Writes one frame as a JSON line and flushes.
    pub fn emit(&self, event: Event) {
        let Ok(mut writer) = self.writer.lock() else {
            return;
        };
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        if let Ok(line) = serde_json::to_string(&Envelope { sequence, event }) {
            let _ = writeln!(writer, "{line}");
            let _ = writer.flush();
        }
    }

    /// Number of frames emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
