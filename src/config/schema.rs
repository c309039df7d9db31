//! Configuration schema.
//!
//! Every section except `pool` is optional and falls back to the defaults
//! documented on each field. Durations are written in humantime form
//! (`1s`, `400ms`, `2m 30s`).

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::pool::SamplingPolicy;
use crate::timer::UnitFormat;

/// Root of a widget configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Widget metadata.
    #[serde(default)]
    pub widget: WidgetMetadata,

    /// Item pool and sampling policy.
    pub pool: PoolConfig,

    /// Countdown settings.
    #[serde(default)]
    pub timer: TimerConfig,

    /// Trigger sequencing.
    #[serde(default)]
    pub trigger: TriggerConfig,

    /// Chat command surface.
    #[serde(default)]
    pub command: CommandConfig,

    /// Alert sound. No sound when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioConfig>,

    /// Presentation tuning.
    #[serde(default)]
    pub presentation: PresentationConfig,
}

/// Widget metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetMetadata {
    /// Name reported in startup frames and logs.
    #[serde(default = "default_widget_name")]
    pub name: String,
}

impl Default for WidgetMetadata {
    fn default() -> Self {
        Self {
            name: default_widget_name(),
        }
    }
}

fn default_widget_name() -> String {
    "carousel".to_string()
}

/// Item pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Item identifiers (paths or URLs) in display-index order.
    pub items: Vec<String>,

    /// Never show the same item twice in a row.
    #[serde(default)]
    pub distinct: bool,

    /// Show every item once before any repeats.
    #[serde(default)]
    pub full_cycle: bool,

    /// Fixed RNG seed for reproducible rotations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl PoolConfig {
    /// Sampling policy selected by the flags.
    #[must_use]
    pub const fn policy(&self) -> SamplingPolicy {
        SamplingPolicy {
            enforce_distinct: self.distinct,
            full_cycle: self.full_cycle,
        }
    }
}

/// Countdown settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Minutes between automatic fires; `0` disables the countdown.
    #[serde(default)]
    pub interval_minutes: u32,

    /// Start with the countdown paused.
    #[serde(default)]
    pub start_paused: bool,

    /// Zero-pad the countdown units.
    #[serde(default)]
    pub pad_with_zeros: bool,

    /// Emit countdown frames.
    #[serde(default = "default_true")]
    pub visible: bool,

    /// Tick period.
    #[serde(
        default = "default_tick",
        serialize_with = "serialize_duration",
        deserialize_with = "deserialize_duration"
    )]
    pub tick: Duration,
}

impl TimerConfig {
    /// Display policy selected by `pad_with_zeros`.
    #[must_use]
    pub const fn unit_format(&self) -> UnitFormat {
        UnitFormat::from_padding(self.pad_with_zeros)
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 0,
            start_paused: false,
            pad_with_zeros: false,
            visible: true,
            tick: default_tick(),
        }
    }
}

const fn default_true() -> bool {
    true
}

const fn default_tick() -> Duration {
    Duration::from_secs(1)
}

/// Trigger sequencing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Alert on the first fire, reveal on the second.
    #[serde(default)]
    pub two_phase: bool,

    /// Overlay text while a reveal is pending.
    #[serde(default = "default_alert_text")]
    pub alert_text: String,

    /// Overlay text while the countdown is paused.
    #[serde(default = "default_paused_text")]
    pub paused_text: String,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            two_phase: false,
            alert_text: default_alert_text(),
            paused_text: default_paused_text(),
        }
    }
}

fn default_alert_text() -> String {
    "?".to_string()
}

fn default_paused_text() -> String {
    "P A U S E D".to_string()
}

/// Chat command surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandConfig {
    /// Trigger phrase, matched case-insensitively.
    #[serde(default = "default_phrase")]
    pub phrase: String,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            phrase: default_phrase(),
        }
    }
}

fn default_phrase() -> String {
    "!img".to_string()
}

/// Alert sound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Sound source (path or URL).
    pub url: String,

    /// Volume in percent, `0..=100`.
    #[serde(default = "default_volume")]
    pub volume: u8,
}

const fn default_volume() -> u8 {
    50
}

/// Presentation tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationConfig {
    /// Length of each fade.
    #[serde(
        default = "default_fade",
        serialize_with = "serialize_duration",
        deserialize_with = "deserialize_duration"
    )]
    pub fade: Duration,

    /// Fail `display_item` for local paths that do not exist.
    #[serde(default)]
    pub verify_local_items: bool,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            fade: default_fade(),
            verify_local_items: false,
        }
    }
}

const fn default_fade() -> Duration {
    Duration::from_millis(400)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&humantime::format_duration(*duration))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_gets_defaults() {
        let config: WidgetConfig = serde_yaml::from_str("pool:\n  items: [a.png]\n").unwrap();
        assert_eq!(config.widget.name, "carousel");
        assert_eq!(config.timer, TimerConfig::default());
        assert_eq!(config.timer.tick, Duration::from_secs(1));
        assert!(config.timer.visible);
        assert_eq!(config.trigger.alert_text, "?");
        assert_eq!(config.trigger.paused_text, "P A U S E D");
        assert_eq!(config.command.phrase, "!img");
        assert!(config.audio.is_none());
        assert_eq!(config.presentation.fade, Duration::from_millis(400));
    }

    #[test]
    fn full_config_parses() {
        let yaml = r"
widget:
  name: lobby
pool:
  items: [a.png, b.png, c.png]
  distinct: true
  full_cycle: true
  seed: 7
timer:
  interval_minutes: 15
  start_paused: true
  pad_with_zeros: true
  visible: false
  tick: 250ms
trigger:
  two_phase: true
  alert_text: '!!'
command:
  phrase: '!pic'
audio:
  url: https://example.com/ding.ogg
  volume: 80
presentation:
  fade: 1s 500ms
  verify_local_items: true
";
        let config: WidgetConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.widget.name, "lobby");
        assert_eq!(
            config.pool.policy(),
            SamplingPolicy {
                enforce_distinct: true,
                full_cycle: true
            }
        );
        assert_eq!(config.pool.seed, Some(7));
        assert_eq!(config.timer.tick, Duration::from_millis(250));
        assert_eq!(config.timer.unit_format(), UnitFormat::ZeroPadded);
        assert_eq!(config.presentation.fade, Duration::from_millis(1500));
        assert_eq!(config.audio.unwrap().volume, 80);
        assert_eq!(config.trigger.paused_text, "P A U S E D");
    }

    #[test]
    fn missing_pool_is_an_error() {
        let result: Result<WidgetConfig, _> = serde_yaml::from_str("timer:\n  interval_minutes: 5\n");
        assert!(result.is_err());
    }

    #[test]
    fn bad_duration_is_an_error() {
        let result: Result<WidgetConfig, _> =
            serde_yaml::from_str("pool:\n  items: [a]\ntimer:\n  tick: soon\n");
        assert!(result.is_err());
    }

    #[test]
    fn durations_serialize_in_humantime() {
        let config: WidgetConfig = serde_yaml::from_str("pool:\n  items: [a.png]\n").unwrap();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("tick: 1s"));
        assert!(yaml.contains("fade: 400ms"));
    }
}
