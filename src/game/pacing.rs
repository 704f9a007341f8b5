//! Tick cadence and overlay timings used by the interactive driver.
//!
//! None of this is round state: the driver picks a delay from the score
//! before each tick and hands it to [`GameState::move_snake`].
//!
//! [`GameState::move_snake`]: super::GameState::move_snake

use std::time::Duration;

/// Countdown shown before a round and when resuming
pub const COUNTDOWN_STEPS: u32 = 3;

/// How long each countdown number stays on screen
pub const COUNTDOWN_STEP: Duration = Duration::from_millis(500);

/// Delay between revealing dead snake segments
pub const DEATH_SEGMENT_STEP: Duration = Duration::from_millis(100);

/// Pause after the death animation before the start prompt returns
pub const DEATH_HOLD: Duration = Duration::from_millis(500);

/// Difficulty ramp: the snake speeds up as the score grows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickPacing {
    pub max_delay_ms: u32,
    pub min_delay_ms: u32,
    pub delay_decrease_ms: u32,
}

impl Default for TickPacing {
    fn default() -> Self {
        Self {
            max_delay_ms: 300,
            min_delay_ms: 50,
            delay_decrease_ms: 10,
        }
    }
}

impl TickPacing {
    /// Milliseconds between ticks at `score`
    pub fn delay_ms(&self, score: u32) -> u32 {
        self.max_delay_ms
            .saturating_sub(score.saturating_mul(self.delay_decrease_ms))
            .max(self.min_delay_ms)
    }

    pub fn delay(&self, score: u32) -> Duration {
        Duration::from_millis(u64::from(self.delay_ms(score)))
    }
}
