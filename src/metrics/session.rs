/// Results kept for the lifetime of the process
///
/// Nothing here is written to disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub high_score: u32,
    pub games_played: u32,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished round; returns true on a new high score
    pub fn on_game_over(&mut self, final_score: u32) -> bool {
        self.games_played += 1;
        if final_score > self.high_score {
            self.high_score = final_score;
            return true;
        }
        false
    }
}

/// Format seconds as `mm:ss`, or a placeholder when there is no limit
pub fn format_time(seconds: Option<u32>) -> String {
    match seconds {
        Some(total_secs) => {
            let minutes = total_secs / 60;
            let seconds = total_secs % 60;
            format!("{:02}:{:02}", minutes, seconds)
        }
        None => "--:--".to_string(),
    }
}
