//! Simulation settings
//!
//! Controls how long a task waits between ticks and how far each tick
//! advances it. A fixed seed makes a whole session reproducible.

use std::ops::Range;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::{TaskError, TaskResult};
use crate::models::MAX_PROGRESS;

/// Lower bound of the tick delay in milliseconds (inclusive)
pub const MIN_TICK_DELAY_MS: u64 = 50;

/// Upper bound of the tick delay in milliseconds (exclusive)
pub const MAX_TICK_DELAY_MS: u64 = 1000;

/// Smallest progress increment per tick (inclusive)
pub const MIN_PROGRESS_INCREMENT: u8 = 1;

/// Upper bound of the progress increment per tick (exclusive)
pub const MAX_PROGRESS_INCREMENT: u8 = 4;

/// Tick timing and increment settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Delay before each tick, in milliseconds (half-open)
    pub delay_ms: Range<u64>,
    /// Progress added by each tick (half-open)
    pub increment: Range<u8>,
    /// Seed for the tick RNG; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            delay_ms: MIN_TICK_DELAY_MS..MAX_TICK_DELAY_MS,
            increment: MIN_PROGRESS_INCREMENT..MAX_PROGRESS_INCREMENT,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed RNG seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Override the tick delay range
    pub fn with_delay_ms(mut self, min: u64, max: u64) -> Self {
        self.delay_ms = min..max;
        self
    }

    /// Override the increment range
    pub fn with_increment(mut self, min: u8, max: u8) -> Self {
        self.increment = min..max;
        self
    }

    /// Check that both ranges can be sampled and that a tick always advances.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::InvalidConfig` describing the first problem found.
    pub fn validate(&self) -> TaskResult<()> {
        if self.delay_ms.is_empty() {
            return Err(TaskError::InvalidConfig {
                message: format!(
                    "delay range {}..{} ms is empty",
                    self.delay_ms.start, self.delay_ms.end
                ),
            });
        }
        if self.increment.is_empty() {
            return Err(TaskError::InvalidConfig {
                message: format!(
                    "increment range {}..{} is empty",
                    self.increment.start, self.increment.end
                ),
            });
        }
        if self.increment.start == 0 {
            return Err(TaskError::InvalidConfig {
                message: "increment must be at least 1".to_string(),
            });
        }
        if self.increment.end > MAX_PROGRESS + 1 {
            return Err(TaskError::InvalidConfig {
                message: format!(
                    "increment bound {} exceeds {}",
                    self.increment.end,
                    MAX_PROGRESS + 1
                ),
            });
        }
        Ok(())
    }

    /// Build the RNG that draws delays and increments
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}
