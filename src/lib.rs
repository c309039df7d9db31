//! `carousel` - timed random-item presentation engine
//!
//! This library provides the building blocks of a stream-overlay widget
//! that rotates through a pool of items on a countdown, with chat and
//! button commands to trigger, reveal, and control the timer.

pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod input;
pub mod observability;
pub mod phase;
pub mod pool;
pub mod presentation;
pub mod scheduler;
pub mod timer;
pub mod widget;
