//! Pool sampler with distinct and full-cycle policies.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::PoolError;

/// Selection policy, fixed for the lifetime of a [`PoolSampler`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingPolicy {
    /// Exclude the previously picked item whenever there is an alternative.
    #[serde(default)]
    pub enforce_distinct: bool,
    /// Draw from a shrinking remainder so every item is shown once per cycle.
    #[serde(default)]
    pub full_cycle: bool,
}

impl SamplingPolicy {
    /// Smallest pool this policy can operate on.
    #[must_use]
    pub const fn min_pool_size(self) -> usize {
        if self.enforce_distinct { 2 } else { 1 }
    }
}

/// Random sampler over an immutable item pool.
///
/// `remaining` is only consulted under [`SamplingPolicy::full_cycle`] and
/// is always a subset of `pool`. It is refilled from `pool` lazily, right
/// before a pick finds it empty.
#[derive(Debug)]
pub struct PoolSampler<R = StdRng> {
    pool: Vec<String>,
    remaining: Vec<String>,
    last_picked: Option<String>,
    policy: SamplingPolicy,
    rng: R,
}

impl PoolSampler<StdRng> {
    /// Creates a sampler seeded from the operating system.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Empty`] for an empty pool and
    /// [`PoolError::TooSmallForDistinct`] when distinct mode is requested
    /// with fewer than two items.
    pub fn new(items: Vec<String>, policy: SamplingPolicy) -> Result<Self, PoolError> {
        Self::with_rng(items, policy, StdRng::from_os_rng())
    }

    /// Creates a sampler with a fixed seed for reproducible rotations.
    ///
    /// # Errors
    ///
    /// Same conditions as [`PoolSampler::new`].
    pub fn seeded(items: Vec<String>, policy: SamplingPolicy, seed: u64) -> Result<Self, PoolError> {
        Self::with_rng(items, policy, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> PoolSampler<R> {
    /// Creates a sampler driven by the given random source.
    ///
    /// # Errors
    ///
    /// Same conditions as [`PoolSampler::new`].
    pub fn with_rng(items: Vec<String>, policy: SamplingPolicy, rng: R) -> Result<Self, PoolError> {
        if items.is_empty() {
            return Err(PoolError::Empty);
        }
        if items.len() < policy.min_pool_size() {
            return Err(PoolError::TooSmallForDistinct { len: items.len() });
        }

        Ok(Self {
            pool: items,
            remaining: Vec::new(),
            last_picked: None,
            policy,
            rng,
        })
    }

    /// Picks an item at random according to the policy.
    pub fn pick(&mut self) -> String {
        if self.policy.full_cycle && self.remaining.is_empty() {
            self.remaining.clone_from(&self.pool);
        }

        let source = if self.policy.full_cycle {
            &self.remaining
        } else {
            &self.pool
        };

        // Draw-local exclusion; the source itself is left untouched.
        let mut candidates: Vec<&String> = source.iter().collect();
        if self.policy.enforce_distinct && source.len() >= 2 {
            if let Some(last) = &self.last_picked {
                let filtered: Vec<&String> =
                    source.iter().filter(|item| *item != last).collect();
                // All entries equal to the last pick (duplicated items):
                // there is no alternative, so fall back to the full source.
                if !filtered.is_empty() {
                    candidates = filtered;
                }
            }
        }

        let idx = self.rng.random_range(0..candidates.len());
        let item = candidates[idx].clone();
        self.apply_aftermath(&item);
        item
    }

    /// Picks the item at a zero-based position, bypassing randomness.
    ///
    /// The aftermath is the same as for [`pick`](Self::pick): the item
    /// becomes the last pick and leaves the full-cycle remainder.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::IndexOutOfRange`] if `index` is past the end.
    pub fn pick_at(&mut self, index: usize) -> Result<String, PoolError> {
        let item = self
            .pool
            .get(index)
            .cloned()
            .ok_or(PoolError::IndexOutOfRange {
                index,
                len: self.pool.len(),
            })?;
        self.apply_aftermath(&item);
        Ok(item)
    }

    fn apply_aftermath(&mut self, item: &str) {
        if self.policy.full_cycle {
            self.remaining.retain(|candidate| candidate != item);
        }
        self.last_picked = Some(item.to_string());
    }

    /// Returns the full pool in configuration order.
    #[must_use]
    pub fn items(&self) -> &[String] {
        &self.pool
    }

    /// Returns the number of items in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    /// Always `false`: construction rejects empty pools.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Returns the most recently picked item.
    #[must_use]
    pub fn last_picked(&self) -> Option<&str> {
        self.last_picked.as_deref()
    }

    /// Returns the items left in the current cycle (full-cycle policy only).
    #[must_use]
    pub fn remaining(&self) -> &[String] {
        &self.remaining
    }

    /// Returns the sampling policy.
    #[must_use]
    pub const fn policy(&self) -> SamplingPolicy {
        self.policy
    }
}
