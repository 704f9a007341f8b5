use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction as LayoutDirection, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::game::{Direction, GameState, GridValue, Position};
use crate::metrics::SessionStats;
use crate::metrics::session::format_time;

/// What the driver is showing on top of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    /// Board only, the round is being played
    Hidden,
    StartPrompt,
    /// Pre-round countdown, value is the number on screen
    Countdown(u32),
    Paused,
    Resuming(u32),
    /// Death animation, `revealed` segments from the head are drawn dead
    Dying { revealed: usize },
}

impl Overlay {
    /// Popup text, if this phase shows one
    pub fn message(&self) -> Option<String> {
        match self {
            Overlay::Hidden => None,
            Overlay::StartPrompt => Some("Press any key to start".to_string()),
            Overlay::Countdown(n) => Some(n.to_string()),
            Overlay::Paused => Some("Pause".to_string()),
            Overlay::Resuming(n) => Some(format!("Resuming in {n}")),
            Overlay::Dying { .. } => None,
        }
    }
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        state: &GameState,
        stats: &SessionStats,
        overlay: Overlay,
    ) {
        let chunks = Layout::default()
            .direction(LayoutDirection::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        frame.render_widget(self.render_stats(state, stats), chunks[0]);

        let (width, height) = board_size(state.rows(), state.cols());
        let board = centered(chunks[1], width, height);
        frame.render_widget(self.render_grid(state, overlay), board);

        if let Some(message) = overlay.message() {
            let popup = centered(board, message.chars().count() as u16 + 6, 3);
            frame.render_widget(Clear, popup);
            frame.render_widget(self.render_overlay(message), popup);
        }

        frame.render_widget(self.render_controls(), chunks[2]);
    }

    fn render_grid(&self, state: &GameState, overlay: Overlay) -> Paragraph<'_> {
        let dead: Vec<Position> = match overlay {
            Overlay::Dying { revealed } => state.snake_positions().take(revealed).collect(),
            _ => Vec::new(),
        };
        let head = state.head_position();

        let mut lines = Vec::with_capacity(state.rows());
        for row in 0..state.rows() {
            let spans: Vec<Span> = (0..state.cols())
                .map(|col| {
                    let pos = Position::new(row as i32, col as i32);
                    if dead.contains(&pos) {
                        dead_span(pos == head)
                    } else if pos == head {
                        head_span(state.direction(), state.is_immune())
                    } else {
                        cell_span(state.cell(pos), state.is_immune())
                    }
                })
                .collect();
            lines.push(Line::from(spans));
        }

        let (title, border) = match overlay {
            Overlay::Dying { .. } => (" GAME OVER ", Color::Red),
            _ => (" Snake ", Color::White),
        };

        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(border))
                .title(title),
        )
    }

    fn render_stats(&self, state: &GameState, stats: &SessionStats) -> Paragraph<'_> {
        let value = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);
        let label = Style::default().fg(Color::Yellow);

        let text = vec![Line::from(vec![
            Span::styled("Score: ", label),
            Span::styled(state.score().to_string(), value),
            Span::raw("    "),
            Span::styled("Lives: ", label),
            Span::styled(state.lives().to_string(), value),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(format_time(state.time_remaining()), value),
            Span::raw("    "),
            Span::styled("Best: ", label),
            Span::styled(stats.high_score.to_string(), Style::default().fg(Color::White)),
        ])];

        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::BOTTOM))
    }

    fn render_overlay(&self, message: String) -> Paragraph<'static> {
        Paragraph::new(Line::from(Span::styled(
            message,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        )
    }

    fn render_controls(&self) -> Paragraph<'_> {
        let text = vec![Line::from(vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to move | "),
            Span::styled("Space", Style::default().fg(Color::Cyan)),
            Span::raw(" to pause | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Head glyph pointing the way the snake travels
pub fn head_glyph(direction: Direction) -> &'static str {
    match direction {
        Direction::Up => "▲ ",
        Direction::Right => "▶ ",
        Direction::Down => "▼ ",
        Direction::Left => "◀ ",
    }
}

fn head_span(direction: Direction, immune: bool) -> Span<'static> {
    let color = if immune { Color::Gray } else { Color::Cyan };
    Span::styled(
        head_glyph(direction),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

fn cell_span(value: GridValue, immune: bool) -> Span<'static> {
    match value {
        GridValue::Snake if immune => Span::styled("□ ", Style::default().fg(Color::Gray)),
        GridValue::Snake => Span::styled("□ ", Style::default().fg(Color::Green)),
        GridValue::Food => Span::styled(
            "O ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        GridValue::Empty | GridValue::Outside => {
            Span::styled(". ", Style::default().fg(Color::DarkGray))
        }
    }
}

fn dead_span(is_head: bool) -> Span<'static> {
    let glyph = if is_head { "X " } else { "x " };
    Span::styled(glyph, Style::default().fg(Color::DarkGray).bg(Color::Red))
}

/// Outer size of the bordered board, two columns per cell
fn board_size(rows: usize, cols: usize) -> (u16, u16) {
    let side = |n: usize| u16::try_from(n).unwrap_or(u16::MAX);
    let width = side(cols).saturating_mul(2).saturating_add(2);
    let height = side(rows).saturating_add(2);
    (width, height)
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}
