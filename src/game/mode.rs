/// Phase of a round
///
/// `NotStarted -> Started -> (Paused -> Resuming -> Started)* -> Over`.
/// A finished round is never restarted; the driver builds a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameMode {
    #[default]
    NotStarted,
    Started,
    Paused,
    Resuming,
    Over,
}

impl GameMode {
    /// Whether the tick driver should advance the snake
    pub fn is_running(&self) -> bool {
        *self == GameMode::Started
    }

    pub fn is_over(&self) -> bool {
        *self == GameMode::Over
    }
}
