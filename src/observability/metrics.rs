//! Prometheus metrics.
//!
//! Label values come from fixed vocabularies (phase names, command kinds),
//! never from chat input, so cardinality stays bounded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::CarouselError;

static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Installs the global Prometheus recorder.
///
/// With `Some(port)` an HTTP scrape endpoint is served on
/// `127.0.0.1:<port>`; with `None` the recorder is installed without one.
/// Repeated calls are no-ops.
///
/// # Errors
///
/// Returns `CarouselError::Io` if the recorder or listener cannot be
/// installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), CarouselError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| CarouselError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

fn describe_metrics() {
    describe_counter!(
        "carousel_fires_total",
        "Trigger fires, labelled by the phase the machine was in"
    );
    describe_counter!("carousel_reveals_total", "Items revealed by a fire");
    describe_counter!(
        "carousel_triggers_dropped_total",
        "Triggers ignored because a sequence was in flight"
    );
    describe_counter!(
        "carousel_commands_total",
        "Chat commands and button presses accepted, by action"
    );
    describe_counter!(
        "carousel_presentation_failures_total",
        "Sequences that ended with a presentation error"
    );
    describe_gauge!("carousel_paused", "1 while the countdown is paused");
    describe_histogram!(
        "carousel_sequence_duration_ms",
        "Wall time of a trigger or timer sequence in milliseconds"
    );
}

/// Records a fire taken from `phase`.
pub fn record_fire(phase: &'static str) {
    counter!("carousel_fires_total", "phase" => phase).increment(1);
}

/// Records a completed reveal.
pub fn record_reveal() {
    counter!("carousel_reveals_total").increment(1);
}

/// Records a trigger dropped by the busy flag. `source` is `"tick"` or `"input"`.
pub fn record_trigger_dropped(source: &'static str) {
    counter!("carousel_triggers_dropped_total", "source" => source).increment(1);
}

/// Records an accepted command.
pub fn record_command(action: &'static str) {
    counter!("carousel_commands_total", "action" => action).increment(1);
}

/// Records a sequence that failed in the presentation layer.
pub fn record_presentation_failure() {
    counter!("carousel_presentation_failures_total").increment(1);
}

/// Publishes the pause state.
pub fn set_paused(paused: bool) {
    gauge!("carousel_paused").set(if paused { 1.0 } else { 0.0 });
}

/// Records how long a sequence held the busy flag.
pub fn record_sequence_duration(action: &'static str, duration: Duration) {
    histogram!("carousel_sequence_duration_ms", "action" => action)
        .record(duration.as_secs_f64() * 1000.0);
}
