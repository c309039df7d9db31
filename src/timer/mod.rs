//! Countdown timer
//!
//! Hour/minute/second countdown that advances one second per tick of an
//! external tick source. The timer itself never schedules anything.
//!
//! # Architecture
//!
//! - [`TimeValue`]: `{hour, minute, second}` triple
//! - [`CountdownTimer`]: baseline + current value, borrow-aware decrement
//! - [`UnitFormat`]: display policy (plain or zero-padded units)
//! - [`parse_duration`]: `[[H:]M:]S` command argument parsing

pub mod countdown;
pub mod duration;
pub mod format;

pub use countdown::{CountdownTimer, TimeValue};
pub use duration::parse_duration;
pub use format::UnitFormat;
