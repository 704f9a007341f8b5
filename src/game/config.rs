use serde::{Deserialize, Serialize};

use super::error::{ConfigError, Result};

/// Length of the snake at the start of every round
pub const INITIAL_SNAKE_LENGTH: usize = 3;

/// Columns kept free on each side when picking the starting column
pub const START_COLUMN_MARGIN: usize = 3;

/// Smallest grid width that leaves a valid starting column
pub const MIN_COLS: usize = 2 * START_COLUMN_MARGIN + 1;

/// Largest rows or columns count; keeps cells addressable as `i32` and the
/// board drawable within a `u16` terminal area
pub const MAX_GRID_SIDE: usize = 1000;

/// Configuration for a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of grid rows
    pub rows: usize,
    /// Number of grid columns
    pub cols: usize,
    /// Lives at the start of a round
    pub lives: u32,
    /// Round length in seconds, `None` for no limit
    pub time_limit_secs: Option<u32>,
    /// How long collisions are ignored after losing a life
    pub immunity_ms: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: 15,
            cols: 15,
            lives: 3,
            time_limit_secs: Some(63),
            immunity_ms: 200,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            ..Default::default()
        }
    }

    pub fn with_lives(mut self, lives: u32) -> Self {
        self.lives = lives;
        self
    }

    pub fn with_time_limit(mut self, secs: Option<u32>) -> Self {
        self.time_limit_secs = secs;
        self
    }

    pub fn with_immunity_ms(mut self, ms: u32) -> Self {
        self.immunity_ms = ms;
        self
    }

    /// Reject settings a round cannot be played with
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 {
            return Err(ConfigError::NoRows);
        }
        if self.cols < MIN_COLS {
            return Err(ConfigError::TooFewColumns {
                cols: self.cols,
                min: MIN_COLS,
            });
        }
        if self.rows > MAX_GRID_SIDE || self.cols > MAX_GRID_SIDE {
            return Err(ConfigError::GridTooLarge {
                rows: self.rows,
                cols: self.cols,
                max: MAX_GRID_SIDE,
            });
        }
        if self.lives == 0 {
            return Err(ConfigError::NoLives);
        }
        if self.time_limit_secs == Some(0) {
            return Err(ConfigError::ZeroTimeLimit);
        }
        if self.immunity_ms == 0 {
            return Err(ConfigError::ZeroImmunity);
        }
        Ok(())
    }
}
