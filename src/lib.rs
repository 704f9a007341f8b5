//! Lives Snake - a terminal Snake game with lives and a round clock
//!
//! This library provides:
//! - Core round logic with no I/O (game module)
//! - Keyboard mapping (input module)
//! - TUI rendering (render module)
//! - Session statistics (metrics module)
//! - The interactive driver (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
