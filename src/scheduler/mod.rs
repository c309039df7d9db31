//! Scheduling context
//!
//! Everything the trigger machinery shares at runtime lives on one
//! [`Scheduler`]: the countdown, the pause flag, the busy flag, and the
//! handle of the tick source.
//!
//! The tick source decrements the countdown once per period and reports
//! [`TickEvent::GoalReached`] on a channel every period while the countdown
//! sits at zero. It never fires triggers itself; the widget loop does that
//! after claiming the busy flag.

pub mod busy;
pub mod context;
mod ticker;

pub use busy::{BusyFlag, BusyGuard};
pub use context::Scheduler;
pub use ticker::TickEvent;
