use thiserror::Error;

/// Rejected game configuration
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Grid needs at least one row")]
    NoRows,
    #[error("Grid needs at least {min} columns to place the starting snake, got {cols}")]
    TooFewColumns { cols: usize, min: usize },
    #[error("Grid of {rows}x{cols} is too large, each side may be at most {max}")]
    GridTooLarge { rows: usize, cols: usize, max: usize },
    #[error("A game needs at least one life")]
    NoLives,
    #[error("Time limit must be at least one second")]
    ZeroTimeLimit,
    #[error("Immunity window must be longer than zero milliseconds")]
    ZeroImmunity,
}

pub type Result<T> = core::result::Result<T, ConfigError>;
