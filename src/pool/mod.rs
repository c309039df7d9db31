//! Item pool sampling
//!
//! Picks the next item to present from a fixed, ordered pool. The
//! behavior is driven by a [`SamplingPolicy`] chosen once at construction:
//!
//! - **distinct**: never hand out the same item twice in a row (needs at
//!   least two items)
//! - **full cycle**: hand out every item once before any item repeats
//!
//! The sampler holds no notion of time; callers decide when to pick.

pub mod sampler;

pub use sampler::{PoolSampler, SamplingPolicy};
