//! Core game logic module for Snake
//!
//! This module contains all the round logic without any I/O or rendering
//! dependencies. A driver feeds it turns and ticks and reads state back.

pub mod config;
pub mod direction;
pub mod engine;
pub mod error;
pub mod mode;
pub mod pacing;
pub mod queue;
pub mod state;

// Re-export commonly used types
pub use config::GameConfig;
pub use direction::Direction;
pub use engine::{GameState, MoveOutcome};
pub use error::ConfigError;
pub use mode::GameMode;
pub use pacing::TickPacing;
pub use queue::DirectionQueue;
pub use state::{Grid, GridValue, Position, Snake};
