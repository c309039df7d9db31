//! Countdown display policy.

use serde::{Deserialize, Serialize};

use super::countdown::TimeValue;

/// How each time unit is rendered.
///
/// Selected once from configuration; the timer never branches on display
/// concerns itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitFormat {
    /// Units as plain integers (`1:5:9`).
    #[default]
    Plain,
    /// Units below ten padded with a leading zero (`01:05:09`).
    ZeroPadded,
}

impl UnitFormat {
    /// Picks the policy from the `pad_with_zeros` configuration flag.
    #[must_use]
    pub const fn from_padding(pad_with_zeros: bool) -> Self {
        if pad_with_zeros {
            Self::ZeroPadded
        } else {
            Self::Plain
        }
    }

    /// Renders a single unit.
    #[must_use]
    pub fn unit(self, n: u32) -> String {
        match self {
            Self::Plain => n.to_string(),
            Self::ZeroPadded => format!("{n:02}"),
        }
    }

    /// Renders a full value as `[H:]M:S`.
    #[must_use]
    pub fn render(self, value: TimeValue, show_hours: bool) -> String {
        let minute = self.unit(value.minute);
        let second = self.unit(value.second);
        if show_hours {
            format!("{}:{minute}:{second}", self.unit(value.hour))
        } else {
            format!("{minute}:{second}")
        }
    }
}
