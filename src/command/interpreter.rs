//! Chat and button dispatch table.

use std::fmt;

use tracing::trace;

use super::args::{parse_args, parse_index};
use crate::phase::Selector;
use crate::timer::{TimeValue, parse_duration};

/// Typed action produced from one inbound message or button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Fire the trigger machine with the given selector.
    Trigger(Selector),
    /// Timer-driven fire; the countdown reached zero.
    Release,
    /// Operate on the countdown.
    Timer(TimerAction),
}

impl Action {
    /// Stable label for logs and metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Trigger(Selector::Random) => "random",
            Self::Trigger(Selector::Index(_)) => "index",
            Self::Release => "release",
            Self::Timer(TimerAction::Pause) => "timer_pause",
            Self::Timer(TimerAction::Resume) => "timer_resume",
            Self::Timer(TimerAction::TogglePause) => "timer_toggle",
            Self::Timer(TimerAction::Reset) => "timer_reset",
            Self::Timer(TimerAction::Set(_)) => "timer_set",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trigger(selector) => write!(f, "trigger ({selector})"),
            Self::Timer(TimerAction::Set(value)) => write!(f, "timer set {value}"),
            other => f.write_str(other.label()),
        }
    }
}

/// Countdown operations reachable from chat or buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// Ignore ticks and show the paused overlay.
    Pause,
    /// Accept ticks again and clear the overlay.
    Resume,
    /// Pause when running, resume when paused.
    TogglePause,
    /// Restore the configured duration and discard a pending reveal.
    Reset,
    /// Overwrite the running countdown.
    Set(TimeValue),
}

/// Button identifiers understood by the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonId {
    /// `randomImgButton`
    RandomImg,
    /// `pauseButton`
    Pause,
    /// `resetButton`
    Reset,
}

impl ButtonId {
    /// Looks up a button by its wire identifier. Case-sensitive.
    #[must_use]
    pub fn from_field(field: &str) -> Option<Self> {
        match field {
            "randomImgButton" => Some(Self::RandomImg),
            "pauseButton" => Some(Self::Pause),
            "resetButton" => Some(Self::Reset),
            _ => None,
        }
    }

    /// Action the button maps to.
    #[must_use]
    pub const fn action(self) -> Action {
        match self {
            Self::RandomImg => Action::Trigger(Selector::Random),
            Self::Pause => Action::Timer(TimerAction::TogglePause),
            Self::Reset => Action::Timer(TimerAction::Reset),
        }
    }
}

/// Turns chat text and button identifiers into [`Action`]s.
///
/// Unrecognized or malformed input yields `None`; nothing is reported back
/// to the sender.
#[derive(Debug, Clone)]
pub struct Interpreter {
    prefix: String,
    pool_len: usize,
}

impl Interpreter {
    /// Creates an interpreter for `phrase` over a pool of `pool_len` items.
    #[must_use]
    pub fn new(phrase: &str, pool_len: usize) -> Self {
        Self {
            prefix: format!("{} ", phrase.to_lowercase()),
            pool_len,
        }
    }

    /// Interprets a chat message.
    ///
    /// The message must start with the trigger phrase followed by a space,
    /// compared case-insensitively. Arguments are lowercased before
    /// dispatch.
    #[must_use]
    pub fn interpret_message(&self, text: &str) -> Option<Action> {
        let head = text.get(..self.prefix.len())?;
        if head.to_lowercase() != self.prefix {
            return None;
        }
        let args = parse_args(&text[self.prefix.len()..].to_lowercase());
        self.interpret_args(&args)
    }

    /// Interprets an already tokenized argument list.
    #[must_use]
    pub fn interpret_args(&self, args: &[String]) -> Option<Action> {
        let action = match args {
            [] => None,
            [first, ..] if first == "random" => Some(Action::Trigger(Selector::Random)),
            [first, rest @ ..] if first == "timer" => {
                rest.first().map(String::as_str).and_then(timer_action)
            }
            [first, ..] => self.index_action(first),
        };
        if action.is_none() {
            trace!(?args, "command ignored");
        }
        action
    }

    /// Interprets a button press.
    #[must_use]
    pub fn interpret_button(&self, field: &str) -> Option<Action> {
        ButtonId::from_field(field).map(ButtonId::action)
    }

    fn index_action(&self, arg: &str) -> Option<Action> {
        let n = parse_index(arg)?;
        (1..=self.pool_len)
            .contains(&n)
            .then(|| Action::Trigger(Selector::Index(n - 1)))
    }
}

fn timer_action(arg: &str) -> Option<Action> {
    let action = match arg {
        "pause" => TimerAction::Pause,
        "resume" => TimerAction::Resume,
        "reset" => TimerAction::Reset,
        duration => TimerAction::Set(parse_duration(duration)?),
    };
    Some(Action::Timer(action))
}
