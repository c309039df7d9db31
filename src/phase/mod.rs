//! Trigger phase machine
//!
//! Sequences a "fire" through one or two phases:
//!
//! - **one-phase**: every fire plays the alert and reveals a new item
//! - **two-phase**: the first fire plays the alert and holds; the second
//!   fire reveals the item and rearms the countdown
//!
//! # Architecture
//!
//! - [`Phase`] / [`TriggerMode`]: the state and the configured mode
//! - [`Selector`]: which item a reveal should show
//! - [`TriggerStateMachine`]: owns the phase, drives sampler, presentation
//!   and scheduler in order

pub mod machine;
pub mod state;

pub use machine::TriggerStateMachine;
pub use state::{FireOutcome, Phase, Selector, TriggerMode};
