//! Shared integration-test harness for spawning a `carousel` widget as a
//! child process, feeding it input lines, and reading its frame stream.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};

/// Default timeout for reading a single frame from the widget.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// A running `carousel` widget with helpers for frame I/O.
///
/// The child process is killed on drop via `kill_on_drop(true)`.
#[allow(clippy::missing_panics_doc)]
pub struct CarouselProcess {
    child: Child,
    stdin: Option<tokio::process::ChildStdin>,
    reader: BufReader<tokio::process::ChildStdout>,
    seen: Vec<Value>,
}

impl CarouselProcess {
    /// Spawns `carousel run` with the given config and extra arguments.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn(config_path: &Path, extra: &[&str]) -> Self {
        let bin = env!("CARGO_BIN_EXE_carousel");
        let mut child = Command::new(bin)
            .args([
                "run",
                "--config",
                config_path.to_str().expect("non-UTF-8 config path"),
                "--quiet",
            ])
            .args(extra)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .expect("failed to spawn carousel");

        let stdin = child.stdin.take().expect("stdin not captured");
        let stdout = child.stdout.take().expect("stdout not captured");

        Self {
            child,
            stdin: Some(stdin),
            reader: BufReader::new(stdout),
            seen: Vec::new(),
        }
    }

    /// Runs a one-shot command to completion and returns its output.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn_command(args: &[&str]) -> std::process::Output {
        std::process::Command::new(env!("CARGO_BIN_EXE_carousel"))
            .args(args)
            .output()
            .expect("failed to run carousel")
    }

    /// Writes one input line.
    #[allow(clippy::missing_panics_doc)]
    pub async fn send_line(&mut self, line: &str) {
        let stdin = self.stdin.as_mut().expect("stdin already closed");
        stdin
            .write_all(format!("{line}\n").as_bytes())
            .await
            .expect("failed to write to stdin");
        stdin.flush().await.expect("failed to flush stdin");
    }

    /// Reads one frame from the widget's stdout.
    ///
    /// Panics on EOF, I/O error, or if no frame arrives within `timeout`.
    #[allow(clippy::missing_panics_doc)]
    pub async fn read_frame(&mut self, timeout: Duration) -> Value {
        let mut line = String::new();
        let result = tokio::time::timeout(timeout, async {
            loop {
                line.clear();
                let n = self
                    .reader
                    .read_line(&mut line)
                    .await
                    .expect("read_line I/O error");
                assert!(n > 0, "unexpected EOF from widget");
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    return serde_json::from_str::<Value>(trimmed)
                        .unwrap_or_else(|e| panic!("invalid JSON from widget: {e}\nline: {line}"));
                }
            }
        })
        .await;
        let frame = result.expect("timed out waiting for frame from widget");
        self.seen.push(frame.clone());
        frame
    }

    /// Reads frames until one of the given type arrives.
    #[allow(clippy::missing_panics_doc)]
    pub async fn expect_frame(&mut self, kind: &str) -> Value {
        loop {
            let frame = self.read_frame(DEFAULT_TIMEOUT).await;
            if frame.get("type").and_then(Value::as_str) == Some(kind) {
                return frame;
            }
        }
    }

    /// Waits for startup to finish.
    pub async fn wait_started(&mut self) -> Value {
        self.expect_frame("WidgetStarted").await
    }

    /// Every frame read so far, in order.
    #[must_use]
    pub fn seen(&self) -> &[Value] {
        &self.seen
    }

    /// Closes stdin and waits for the process to exit.
    #[allow(clippy::missing_panics_doc)]
    pub async fn shutdown(&mut self) -> ExitStatus {
        drop(self.stdin.take());

        // Drain the rest of the stream so the child never blocks on stdout.
        let mut rest = String::new();
        let _ = tokio::time::timeout(DEFAULT_TIMEOUT, async {
            while self.reader.read_line(&mut rest).await.unwrap_or(0) > 0 {}
        })
        .await;
        for line in rest.lines().filter(|l| !l.trim().is_empty()) {
            if let Ok(frame) = serde_json::from_str(line) {
                self.seen.push(frame);
            }
        }

        tokio::time::timeout(DEFAULT_TIMEOUT, self.child.wait())
            .await
            .expect("widget did not exit after stdin closed")
            .expect("failed to wait for widget")
    }

    /// Returns the path to a test fixture.
    #[must_use]
    pub fn fixture_path(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }
}
