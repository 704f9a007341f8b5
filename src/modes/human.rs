//! Interactive play in the terminal
//!
//! One tokio task owns the round and multiplexes keyboard events, the
//! movement tick, the one-second round clock, overlay timers and rendering.
//! Nothing runs in parallel, so the round needs no locking.

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior, interval, sleep_until};
use tracing::{debug, info};

use crate::game::pacing::{COUNTDOWN_STEP, COUNTDOWN_STEPS, DEATH_HOLD, DEATH_SEGMENT_STEP};
use crate::game::{ConfigError, GameConfig, GameMode, GameState, MoveOutcome, TickPacing};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::SessionStats;
use crate::render::{Overlay, Renderer};

pub struct HumanMode {
    state: GameState,
    stats: SessionStats,
    pacing: TickPacing,
    renderer: Renderer,
    input_handler: InputHandler,
    overlay: Overlay,
    /// When the current overlay phase moves on
    phase_deadline: Option<Instant>,
    should_quit: bool,
}

impl HumanMode {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let state = GameState::new(config)?;

        Ok(Self {
            state,
            stats: SessionStats::new(),
            pacing: TickPacing::default(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            overlay: Overlay::StartPrompt,
            phase_deadline: None,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        // The move delay shrinks with the score, so the next tick is
        // rescheduled after every move rather than using a fixed interval
        let mut next_tick = Instant::now() + self.pacing.delay(self.state.score());

        let mut clock = interval(Duration::from_secs(1));
        clock.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // Render at 30 FPS (33ms per frame)
        let mut render_timer = interval(Duration::from_millis(33));

        loop {
            let phase_deadline = self.phase_deadline;

            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(err)) => return Err(err).context("Failed to read terminal event"),
                        None => self.should_quit = true,
                    }
                }

                // Movement tick, keeps its cadence while paused
                _ = sleep_until(next_tick) => {
                    self.on_tick();
                    next_tick = Instant::now() + self.pacing.delay(self.state.score());
                }

                // Round clock
                _ = clock.tick() => {
                    self.on_clock();
                }

                // Countdown, resume and death animation steps
                _ = wait_for(phase_deadline) => {
                    self.advance_phase();
                }

                // Render frame
                _ = render_timer.tick() => {
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &self.state, &self.stats, self.overlay);
                    }).context("Failed to draw frame")?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                info!(
                    high_score = self.stats.high_score,
                    games = self.stats.games_played,
                    "quitting"
                );
                break;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return;
            }

            let action = self.input_handler.handle_key_event(key);
            self.handle_action(action);
        }
    }

    fn handle_action(&mut self, action: KeyAction) {
        if action == KeyAction::Quit {
            self.should_quit = true;
            return;
        }

        if self.overlay == Overlay::StartPrompt {
            self.begin_countdown();
            return;
        }

        match (action, self.state.mode()) {
            (KeyAction::TogglePause, GameMode::Started) => {
                self.state.toggle_pause();
                self.overlay = Overlay::Paused;
                info!(score = self.state.score(), "paused");
            }
            (KeyAction::TogglePause, GameMode::Paused) => {
                self.state.toggle_pause();
                self.overlay = Overlay::Resuming(COUNTDOWN_STEPS);
                self.schedule(COUNTDOWN_STEP);
            }
            // Turns may be lined up while paused, not during countdowns
            (KeyAction::Turn(direction), GameMode::Started | GameMode::Paused) => {
                if !self.state.change_direction(direction) {
                    debug!(?direction, "turn ignored");
                }
            }
            _ => {}
        }
    }

    fn on_tick(&mut self) {
        let delay_ms = self.pacing.delay_ms(self.state.score());
        match self.state.move_snake(delay_ms) {
            MoveOutcome::Died => self.begin_game_over(),
            MoveOutcome::LostLife { lives_left } => {
                debug!(lives_left, "snake crashed");
            }
            _ => {}
        }
    }

    fn on_clock(&mut self) {
        if self.state.tick_clock() {
            self.begin_game_over();
        }
    }

    fn advance_phase(&mut self) {
        self.phase_deadline = None;

        match self.overlay {
            Overlay::Countdown(n) if n > 1 => {
                self.overlay = Overlay::Countdown(n - 1);
                self.schedule(COUNTDOWN_STEP);
            }
            Overlay::Countdown(_) => {
                self.state.start();
                self.overlay = Overlay::Hidden;
                info!(
                    rows = self.state.rows(),
                    cols = self.state.cols(),
                    lives = self.state.lives(),
                    "round started"
                );
            }
            Overlay::Resuming(n) if n > 1 => {
                self.overlay = Overlay::Resuming(n - 1);
                self.schedule(COUNTDOWN_STEP);
            }
            Overlay::Resuming(_) => {
                self.state.resume();
                self.overlay = Overlay::Hidden;
                info!("resumed");
            }
            Overlay::Dying { revealed } if revealed < self.state.snake_len() => {
                self.reveal_dead_segment(revealed + 1);
            }
            Overlay::Dying { .. } => {
                self.state = self.state.next_round();
                self.overlay = Overlay::StartPrompt;
            }
            Overlay::Hidden | Overlay::StartPrompt | Overlay::Paused => {}
        }
    }

    fn begin_countdown(&mut self) {
        self.overlay = Overlay::Countdown(COUNTDOWN_STEPS);
        self.schedule(COUNTDOWN_STEP);
    }

    fn begin_game_over(&mut self) {
        let score = self.state.score();
        let best = self.stats.on_game_over(score);
        info!(score, lives = self.state.lives(), new_high_score = best, "game over");
        self.reveal_dead_segment(1);
    }

    fn reveal_dead_segment(&mut self, revealed: usize) {
        self.overlay = Overlay::Dying { revealed };
        if revealed >= self.state.snake_len() {
            self.schedule(DEATH_SEGMENT_STEP + DEATH_HOLD);
        } else {
            self.schedule(DEATH_SEGMENT_STEP);
        }
    }

    fn schedule(&mut self, after: Duration) {
        self.phase_deadline = Some(Instant::now() + after);
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
