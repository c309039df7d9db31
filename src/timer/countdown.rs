//! Countdown state and tick arithmetic.

use std::fmt;

use super::format::UnitFormat;

/// An `{hour, minute, second}` triple.
///
/// Components are unsigned, so "at or below zero" and "exactly zero"
/// coincide and a decrement can never overshoot the goal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TimeValue {
    /// Hours, unbounded
    pub hour: u32,
    /// Minutes, 0..=59 when normalized
    pub minute: u32,
    /// Seconds, 0..=59 when normalized
    pub second: u32,
}

impl TimeValue {
    /// The goal value `(0, 0, 0)`.
    pub const ZERO: Self = Self::new(0, 0, 0);

    /// Creates a new time value.
    #[must_use]
    pub const fn new(hour: u32, minute: u32, second: u32) -> Self {
        Self {
            hour,
            minute,
            second,
        }
    }

    /// Splits a total number of minutes into hours and minutes.
    #[must_use]
    pub const fn from_minutes(total_minutes: u32) -> Self {
        Self::new(total_minutes / 60, total_minutes % 60, 0)
    }

    /// Returns `true` when every component is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.hour == 0 && self.minute == 0 && self.second == 0
    }

    /// Total length in seconds.
    #[must_use]
    pub const fn as_secs(self) -> u64 {
        (self.hour as u64) * 3600 + (self.minute as u64) * 60 + self.second as u64
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

/// Countdown timer with a configured baseline and a running value.
///
/// `start` is the value restored by [`reset`](Self::reset); `current` is
/// decremented once per tick by [`decrease`](Self::decrease).
#[derive(Debug, Clone)]
pub struct CountdownTimer {
    start: TimeValue,
    current: TimeValue,
    activated: bool,
    format: UnitFormat,
}

impl CountdownTimer {
    /// Creates an unconfigured (inactive) timer using the given display policy.
    #[must_use]
    pub const fn new(format: UnitFormat) -> Self {
        Self {
            start: TimeValue::ZERO,
            current: TimeValue::ZERO,
            activated: false,
            format,
        }
    }

    /// Creates a timer already configured for `total_minutes`.
    #[must_use]
    pub fn with_minutes(total_minutes: u32, format: UnitFormat) -> Self {
        let mut timer = Self::new(format);
        timer.configure(total_minutes);
        timer
    }

    /// Sets the baseline from a total number of minutes and resets to it.
    ///
    /// A duration of zero leaves the timer inactive: no tick source should
    /// be driving it.
    pub fn configure(&mut self, total_minutes: u32) {
        self.start = TimeValue::from_minutes(total_minutes);
        self.activated = total_minutes > 0;
        self.reset();
    }

    /// Overwrites the running value. Range clamping is the caller's job.
    pub const fn set_time(&mut self, value: TimeValue) {
        self.current = value;
    }

    /// Restores the running value to the baseline.
    pub const fn reset(&mut self) {
        self.current = self.start;
    }

    /// Decrements the running value by one second.
    ///
    /// Returns `false` without touching the value when the goal has
    /// already been reached. Borrows roll over second → minute → hour,
    /// e.g. `(0,1,0)` becomes `(0,0,59)` and `(1,0,0)` becomes `(0,59,59)`.
    pub const fn decrease(&mut self) -> bool {
        if self.has_reached_goal() {
            return false;
        }

        let t = &mut self.current;
        if t.second > 0 {
            t.second -= 1;
        } else if t.minute > 0 {
            t.minute -= 1;
            t.second = 59;
        } else {
            t.hour -= 1;
            t.minute = 59;
            t.second = 59;
        }

        true
    }

    /// Returns `true` once every component is at (or below) zero.
    #[must_use]
    pub const fn has_reached_goal(&self) -> bool {
        self.current.is_zero()
    }

    /// Returns the running value.
    #[must_use]
    pub const fn current(&self) -> TimeValue {
        self.current
    }

    /// Returns the baseline value.
    #[must_use]
    pub const fn start(&self) -> TimeValue {
        self.start
    }

    /// Returns `true` if a non-zero duration was configured.
    #[must_use]
    pub const fn is_activated(&self) -> bool {
        self.activated
    }

    /// Returns the display policy.
    #[must_use]
    pub const fn format(&self) -> UnitFormat {
        self.format
    }

    /// Renders the running value for display.
    ///
    /// The hour slot is only shown when the baseline or the running value
    /// carries hours.
    #[must_use]
    pub fn display(&self) -> String {
        let show_hours = self.start.hour > 0 || self.current.hour > 0;
        self.format.render(self.current, show_hours)
    }
}

impl Default for CountdownTimer {
    fn default() -> Self {
        Self::new(UnitFormat::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer_at(h: u32, m: u32, s: u32) -> CountdownTimer {
        let mut timer = CountdownTimer::new(UnitFormat::Plain);
        timer.set_time(TimeValue::new(h, m, s));
        timer
    }

    #[test]
    fn test_configure_splits_minutes() {
        let timer = CountdownTimer::with_minutes(135, UnitFormat::Plain);
        assert_eq!(timer.start(), TimeValue::new(2, 15, 0));
        assert_eq!(timer.current(), TimeValue::new(2, 15, 0));
        assert!(timer.is_activated());
    }

    #[test]
    fn test_configure_zero_is_inactive() {
        let timer = CountdownTimer::with_minutes(0, UnitFormat::Plain);
        assert!(!timer.is_activated());
        assert!(timer.has_reached_goal());
    }

    #[test]
    fn test_five_seconds_reach_goal() {
        let mut timer = timer_at(0, 0, 5);
        for _ in 0..5 {
            assert!(timer.decrease());
        }
        assert_eq!(timer.current(), TimeValue::ZERO);
        assert!(timer.has_reached_goal());

        assert!(!timer.decrease());
        assert_eq!(timer.current(), TimeValue::ZERO);
    }

    #[test]
    fn test_minute_borrow() {
        let mut timer = timer_at(0, 1, 0);
        assert!(timer.decrease());
        assert_eq!(timer.current(), TimeValue::new(0, 0, 59));
    }

    #[test]
    fn test_hour_borrow() {
        let mut timer = timer_at(1, 0, 0);
        assert!(timer.decrease());
        assert_eq!(timer.current(), TimeValue::new(0, 59, 59));
    }

    #[test]
    fn test_unnormalized_seconds_count_down() {
        let mut timer = timer_at(0, 0, 90);
        assert!(timer.decrease());
        assert_eq!(timer.current(), TimeValue::new(0, 0, 89));
    }

    #[test]
    fn test_reset_restores_baseline() {
        let mut timer = CountdownTimer::with_minutes(2, UnitFormat::Plain);
        timer.decrease();
        timer.decrease();
        assert_eq!(timer.current(), TimeValue::new(0, 1, 58));
        timer.reset();
        assert_eq!(timer.current(), TimeValue::new(0, 2, 0));
    }

    #[test]
    fn test_set_time_keeps_baseline() {
        let mut timer = CountdownTimer::with_minutes(5, UnitFormat::Plain);
        timer.set_time(TimeValue::new(0, 1, 30));
        assert_eq!(timer.current(), TimeValue::new(0, 1, 30));
        assert_eq!(timer.start(), TimeValue::new(0, 5, 0));
    }

    #[test]
    fn test_full_countdown_length() {
        let mut timer = CountdownTimer::with_minutes(61, UnitFormat::Plain);
        let mut ticks = 0_u64;
        while timer.decrease() {
            ticks += 1;
        }
        assert_eq!(ticks, 61 * 60);
    }

    #[test]
    fn test_display_hides_hour_slot() {
        let timer = CountdownTimer::with_minutes(5, UnitFormat::ZeroPadded);
        assert_eq!(timer.display(), "05:00");
    }

    #[test]
    fn test_display_shows_hour_slot() {
        let timer = CountdownTimer::with_minutes(75, UnitFormat::Plain);
        assert_eq!(timer.display(), "1:15:0");
    }

    #[test]
    fn test_time_value_as_secs() {
        assert_eq!(TimeValue::new(1, 2, 3).as_secs(), 3723);
        assert_eq!(TimeValue::new(1, 2, 3).to_string(), "1:02:03");
    }
}
