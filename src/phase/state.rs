//! Phase, mode, and selector types.

use std::fmt;

use serde::Serialize;

/// Position within a trigger sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Waiting for a fire. One-phase machines never leave this state.
    #[default]
    Idle,
    /// Alert has played; the next fire reveals.
    AwaitingReveal,
}

impl Phase {
    /// Stable label for logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingReveal => "awaiting_reveal",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How many steps a fire takes, chosen at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMode {
    /// Fire reveals immediately.
    #[default]
    OnePhase,
    /// Fire alerts first, a second fire reveals.
    TwoPhase,
}

impl TriggerMode {
    /// Picks the mode from the `two_phase` configuration flag.
    #[must_use]
    pub const fn from_two_phase(two_phase: bool) -> Self {
        if two_phase {
            Self::TwoPhase
        } else {
            Self::OnePhase
        }
    }

    /// Stable label for logs and events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OnePhase => "one_phase",
            Self::TwoPhase => "two_phase",
        }
    }
}

/// Which item a reveal shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// Random pick under the configured sampling policy.
    Random,
    /// Zero-based pool position.
    Index(usize),
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Random => f.write_str("random"),
            Self::Index(i) => write!(f, "index {i}"),
        }
    }
}

/// What a completed fire did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FireOutcome {
    /// Alert played, reveal pending.
    Alerted,
    /// The given item is now displayed and the countdown rearmed.
    Revealed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_phase_is_idle() {
        assert_eq!(Phase::default(), Phase::Idle);
    }

    #[test]
    fn test_mode_from_flag() {
        assert_eq!(TriggerMode::from_two_phase(true), TriggerMode::TwoPhase);
        assert_eq!(TriggerMode::from_two_phase(false), TriggerMode::OnePhase);
    }

    #[test]
    fn test_selector_display() {
        assert_eq!(Selector::Random.to_string(), "random");
        assert_eq!(Selector::Index(3).to_string(), "index 3");
    }
}
