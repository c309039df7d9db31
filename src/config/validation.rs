//! Configuration validation.
//!
//! Runs on the deserialized [`WidgetConfig`] and collects every issue
//! instead of stopping at the first one.

use std::collections::HashSet;

use crate::config::loader::ConfigLimits;
use crate::config::schema::WidgetConfig;
use crate::error::{Severity, ValidationIssue};

/// Countdowns longer than this are accepted with a warning.
const LONG_INTERVAL_MINUTES: u32 = 24 * 60;

/// Outcome of validating one configuration.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Issues that prevent the widget from starting.
    pub errors: Vec<ValidationIssue>,

    /// Informational issues.
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Collect-all configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `config` against the built-in rules and `limits`.
    pub fn validate(&mut self, config: &WidgetConfig, limits: &ConfigLimits) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_widget(config);
        self.validate_pool(config, limits);
        self.validate_timer(config);
        self.validate_trigger(config);
        self.validate_command(config);
        self.validate_audio(config);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    // ========================================================================
    // Sections
    // ========================================================================

    fn validate_widget(&mut self, config: &WidgetConfig) {
        if config.widget.name.trim().is_empty() {
            self.add_error("widget.name", "widget name cannot be empty");
        }
    }

    fn validate_pool(&mut self, config: &WidgetConfig, limits: &ConfigLimits) {
        let pool = &config.pool;

        if pool.items.is_empty() {
            self.add_error("pool.items", "item pool is empty");
            return;
        }

        if pool.distinct && pool.items.len() < 2 {
            self.add_error(
                "pool.distinct",
                &format!(
                    "distinct mode needs at least 2 items, pool has {}",
                    pool.items.len()
                ),
            );
        }

        if pool.items.len() > limits.max_pool_items {
            self.add_error(
                "pool.items",
                &format!(
                    "pool has {} items, limit is {}",
                    pool.items.len(),
                    limits.max_pool_items
                ),
            );
        }

        let mut seen = HashSet::new();
        for (i, item) in pool.items.iter().enumerate() {
            let path = format!("pool.items[{i}]");
            if item.trim().is_empty() {
                self.add_error(&path, "item identifier cannot be empty");
            } else if !seen.insert(item.as_str()) {
                self.add_warning(&path, &format!("duplicate item '{item}'"));
            }
        }
    }

    fn validate_timer(&mut self, config: &WidgetConfig) {
        let timer = &config.timer;

        if timer.tick.is_zero() {
            self.add_error("timer.tick", "tick period must be greater than zero");
        }

        if timer.interval_minutes > LONG_INTERVAL_MINUTES {
            self.add_warning(
                "timer.interval_minutes",
                "countdown is longer than 24 hours",
            );
        }

        if timer.start_paused && timer.interval_minutes == 0 {
            self.add_warning(
                "timer.start_paused",
                "start_paused has no effect without a countdown",
            );
        }
    }

    fn validate_trigger(&mut self, config: &WidgetConfig) {
        if config.trigger.two_phase && config.timer.interval_minutes == 0 {
            self.add_warning(
                "trigger.two_phase",
                "two-phase mode without a countdown only advances on commands",
            );
        }
    }

    fn validate_command(&mut self, config: &WidgetConfig) {
        let phrase = &config.command.phrase;
        if phrase.trim().is_empty() {
            self.add_error("command.phrase", "trigger phrase cannot be empty");
        }
    }

    fn validate_audio(&mut self, config: &WidgetConfig) {
        let Some(audio) = &config.audio else {
            return;
        };
        if audio.url.trim().is_empty() {
            self.add_error("audio.url", "audio source cannot be empty");
        }
        if audio.volume > 100 {
            self.add_error(
                "audio.volume",
                &format!("volume must be 0-100, got {}", audio.volume),
            );
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn add_error(&mut self, path: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Error,
        });
    }

    fn add_warning(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Warning,
        });
    }
}
