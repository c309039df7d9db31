//! Inbound chat messages and button presses.
//!
//! Each input line is one event. Lines starting with `{` are JSON:
//!
//! ```json
//! {"type": "message", "text": "!img random"}
//! {"type": "button", "field": "pauseButton"}
//! ```
//!
//! Any other non-empty line, including one that starts with `{` but does
//! not parse as an event, is taken as chat text.

use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::loader::env_or;

/// Default maximum line length in bytes (`CAROUSEL_MAX_LINE_LENGTH`).
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

/// One inbound event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// Chat message text.
    Message {
        /// Raw message text.
        text: String,
    },
    /// Button press.
    Button {
        /// Button identifier.
        field: String,
    },
}

/// Parses one input line. Returns `None` only for blank lines.
#[must_use]
pub fn parse_line(line: &str) -> Option<InboundEvent> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    if !trimmed.starts_with('{') {
        return Some(InboundEvent::Message {
            text: trimmed.to_string(),
        });
    }
    match serde_json::from_str(trimmed) {
        Ok(event) => Some(event),
        Err(e) => {
            debug!(error = %e, line = %sanitize_for_log(trimmed, 200), "not an input event, reading as chat text");
            Some(InboundEvent::Message {
                text: trimmed.to_string(),
            })
        }
    }
}

/// Source of inbound events.
#[async_trait::async_trait]
pub trait InputSource: Send {
    /// Waits for the next event. `Ok(None)` means the source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the underlying reader fails.
    async fn next_event(&mut self) -> std::io::Result<Option<InboundEvent>>;
}

/// Newline-delimited input over any async reader.
///
/// A partially read line is kept on the struct, so dropping a pending
/// [`next_event`](InputSource::next_event) future loses nothing.
#[derive(Debug)]
pub struct LineInput<R> {
    reader: BufReader<R>,
    max_line_length: usize,
    line: Vec<u8>,
    overflowed: bool,
}

impl LineInput<tokio::io::Stdin> {
    /// Reads from stdin, honoring `CAROUSEL_MAX_LINE_LENGTH`.
    #[must_use]
    pub fn stdin() -> Self {
        let max = env_or("CAROUSEL_MAX_LINE_LENGTH", DEFAULT_MAX_LINE_LENGTH);
        Self::new(tokio::io::stdin(), max)
    }
}

impl<R: AsyncRead + Unpin + Send> LineInput<R> {
    /// Wraps `reader`; lines longer than `max_line_length` are skipped.
    pub fn new(reader: R, max_line_length: usize) -> Self {
        Self {
            reader: BufReader::new(reader),
            max_line_length,
            line: Vec::new(),
            overflowed: false,
        }
    }

    /// Accumulates one line into `self.line` without ever buffering more
    /// than the limit. Returns `Ok(false)` at EOF with nothing pending.
    async fn fill_line(&mut self) -> std::io::Result<bool> {
        loop {
            let available = self.reader.fill_buf().await?;
            if available.is_empty() {
                return Ok(!self.line.is_empty() || self.overflowed);
            }

            let (chunk_len, consumed, done) = available
                .iter()
                .position(|&b| b == b'\n')
                .map_or((available.len(), available.len(), false), |pos| {
                    (pos, pos + 1, true)
                });

            if !self.overflowed {
                let room = self.max_line_length.saturating_sub(self.line.len());
                if chunk_len > room {
                    self.overflowed = true;
                    self.line.clear();
                } else {
                    self.line.extend_from_slice(&available[..chunk_len]);
                }
            }
            self.reader.consume(consumed);

            if done {
                return Ok(true);
            }
        }
    }
}

#[async_trait::async_trait]
impl<R: AsyncRead + Unpin + Send> InputSource for LineInput<R> {
    async fn next_event(&mut self) -> std::io::Result<Option<InboundEvent>> {
        loop {
            if !self.fill_line().await? {
                return Ok(None);
            }
            let line = std::mem::take(&mut self.line);
            if std::mem::take(&mut self.overflowed) {
                warn!(limit = self.max_line_length, "input line too long, skipping");
                continue;
            }
            match std::str::from_utf8(&line) {
                Ok(text) => {
                    if let Some(event) = parse_line(text) {
                        return Ok(Some(event));
                    }
                }
                Err(e) => warn!("invalid UTF-8 in input, skipping line: {e}"),
            }
        }
    }
}

#[async_trait::async_trait]
impl InputSource for mpsc::UnboundedReceiver<InboundEvent> {
    async fn next_event(&mut self) -> std::io::Result<Option<InboundEvent>> {
        Ok(self.recv().await)
    }
}

/// Truncates and strips control characters from untrusted input.
fn sanitize_for_log(input: &str, max_len: usize) -> String {
    input
        .chars()
        .take(max_len)
        .map(|c| {
            if c.is_control() && c != '\t' {
                '\u{FFFD}'
            } else {
                c
            }
        })
        .collect()
}
