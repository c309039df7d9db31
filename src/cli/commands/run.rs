//! `run` command.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::cli::args::RunArgs;
use crate::config::{ConfigLimits, ConfigLoader, LoadWarning, Validator, WidgetConfig};
use crate::error::{CarouselError, ValidationIssue};
use crate::input::LineInput;
use crate::observability::EventEmitter;
use crate::presentation::{AlertSound, AudioPort, ConsolePresenter};
use crate::widget::{Widget, WidgetOptions};

/// Start the widget on stdin/stdout.
///
/// # Errors
///
/// Returns a configuration error if the file fails to load or the pool
/// cannot back the sampling policy, or an I/O error if the frame sink
/// cannot be opened or stdin fails.
pub async fn run(args: &RunArgs, cancel: CancellationToken) -> Result<(), CarouselError> {
    tracing::info!(config = %args.config.display(), "loading configuration");
    let load_result = ConfigLoader::with_defaults().load(&args.config)?;

    for warning in &load_result.warnings {
        tracing::warn!(
            location = warning.location.as_deref().unwrap_or("<unknown>"),
            "{}",
            warning.message
        );
    }

    let config = apply_overrides(load_result.config, args);
    for issue in override_warnings(&config, &load_result.warnings) {
        tracing::warn!(location = %issue.path, "{} (after command-line overrides)", issue.message);
    }

    if let Some(port) = args.metrics_port {
        crate::observability::init_metrics(Some(port))?;
        tracing::info!(port, "Prometheus metrics endpoint started");
    }

    let event_emitter = Arc::new(if let Some(ref path) = args.events_file {
        EventEmitter::from_file(path)?
    } else {
        EventEmitter::stdout()
    });

    let presentation = Arc::new(
        ConsolePresenter::new(Arc::clone(&event_emitter), config.presentation.fade)
            .with_local_verification(config.presentation.verify_local_items)
            .with_countdown_visible(config.timer.visible),
    );
    let audio: Arc<dyn AudioPort> = match &config.audio {
        Some(audio) => Arc::new(AlertSound::new(
            Some(audio.url.clone()),
            audio.volume,
            Arc::clone(&event_emitter),
        )),
        None => Arc::new(AlertSound::silent(Arc::clone(&event_emitter))),
    };

    let widget = Widget::new(WidgetOptions {
        config,
        presentation,
        audio,
        event_emitter,
        cancel,
    })?;
    widget.run(LineInput::stdin()).await
}

/// Applies command-line overrides on top of the loaded file.
fn apply_overrides(config: Arc<WidgetConfig>, args: &RunArgs) -> Arc<WidgetConfig> {
    if !args.two_phase && !args.start_paused && args.seed.is_none() {
        return config;
    }

    let mut config = Arc::unwrap_or_clone(config);
    config.trigger.two_phase |= args.two_phase;
    config.timer.start_paused |= args.start_paused;
    if let Some(seed) = args.seed {
        config.pool.seed = Some(seed);
    }
    Arc::new(config)
}

/// Validation warnings raised by the overridden configuration that the
/// file alone did not produce.
fn override_warnings(config: &WidgetConfig, reported: &[LoadWarning]) -> Vec<ValidationIssue> {
    Validator::new()
        .validate(config, &ConfigLimits::default())
        .warnings
        .into_iter()
        .filter(|issue| {
            !reported
                .iter()
                .any(|w| w.location.as_deref() == Some(issue.path.as_str()))
        })
        .collect()
}
