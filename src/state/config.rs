//! Engine configuration.

use std::ops::RangeInclusive;
use std::time::Duration;

use serde::Deserialize;

use super::board::{MAX_BOARD_SIZE, MIN_BOARD_SIZE};

/// Default time a roll stays observable before it is applied (600 ms).
pub const DEFAULT_ROLL_DELAY: Duration = Duration::from_millis(600);

/// Default first half of the opponent's thinking time (700 ms).
pub const DEFAULT_THINK_DELAY: Duration = Duration::from_millis(700);

/// Default second half of the opponent's thinking time (500 ms).
pub const DEFAULT_DECIDE_DELAY: Duration = Duration::from_millis(500);

/// Largest board side a config may allow. Keeps N² and the solver tables small.
pub const MAX_CONFIGURABLE_SIZE: u32 = 1024;

/// Tunables for a [`SessionEngine`](super::engine::SessionEngine).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub roll_delay_ms: u64,
    pub think_delay_ms: u64,
    pub decide_delay_ms: u64,
    pub min_board_size: u32,
    pub max_board_size: u32,
    /// Dice seed; entropy when absent
    pub seed: Option<u64>,
    pub record_moves: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            roll_delay_ms: DEFAULT_ROLL_DELAY.as_millis() as u64,
            think_delay_ms: DEFAULT_THINK_DELAY.as_millis() as u64,
            decide_delay_ms: DEFAULT_DECIDE_DELAY.as_millis() as u64,
            min_board_size: MIN_BOARD_SIZE,
            max_board_size: MAX_BOARD_SIZE,
            seed: None,
            record_moves: true,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("board size range {min}..={max} is empty or below 2")]
    BoardSizeRange { min: u32, max: u32 },
    #[error("max board size {max} exceeds the limit of {limit}")]
    BoardSizeTooLarge { max: u32, limit: u32 },
}

impl EngineConfig {
    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_board_size < 2 || self.min_board_size > self.max_board_size {
            return Err(ConfigError::BoardSizeRange {
                min: self.min_board_size,
                max: self.max_board_size,
            });
        }
        if self.max_board_size > MAX_CONFIGURABLE_SIZE {
            return Err(ConfigError::BoardSizeTooLarge {
                max: self.max_board_size,
                limit: MAX_CONFIGURABLE_SIZE,
            });
        }
        Ok(())
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn roll_delay(&self) -> Duration {
        Duration::from_millis(self.roll_delay_ms)
    }

    pub fn think_delay(&self) -> Duration {
        Duration::from_millis(self.think_delay_ms)
    }

    pub fn decide_delay(&self) -> Duration {
        Duration::from_millis(self.decide_delay_ms)
    }

    pub fn board_sizes(&self) -> RangeInclusive<u32> {
        self.min_board_size..=self.max_board_size
    }
}
