use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use tracing::{debug, info};

use super::{
    config::{GameConfig, INITIAL_SNAKE_LENGTH, START_COLUMN_MARGIN},
    direction::Direction,
    error::Result,
    mode::GameMode,
    queue::DirectionQueue,
    state::{Grid, GridValue, Position, Snake},
};

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The round is not running, nothing happened
    Idle,
    /// The snake advanced one cell
    Moved,
    /// The snake advanced onto food and grew
    Ate,
    /// A wall or the body was hit and a life was lost
    LostLife { lives_left: u32 },
    /// A hit while immune; the move was dropped
    Bounced,
    /// The last life was lost and the round is over
    Died,
}

/// One round of Snake
///
/// Owns the board, the snake and all counters. Built fresh for every round;
/// use [`GameState::next_round`] instead of resetting.
#[derive(Debug, Clone)]
pub struct GameState {
    config: GameConfig,
    grid: Grid,
    snake: Snake,
    dir: Direction,
    pending: DirectionQueue,
    score: u32,
    lives: u32,
    immune_remaining_ms: Option<i64>,
    time_remaining: Option<u32>,
    mode: GameMode,
    rng: StdRng,
}

impl GameState {
    /// Create a round with a random starting layout
    pub fn new(config: GameConfig) -> Result<Self> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create a round drawing all randomness from `rng`
    pub fn with_rng(config: GameConfig, rng: StdRng) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, rng))
    }

    /// Start a fresh round with the same configuration
    pub fn next_round(&self) -> Self {
        Self::build(self.config.clone(), StdRng::from_entropy())
    }

    fn build(config: GameConfig, mut rng: StdRng) -> Self {
        let row = rng.gen_range(0..config.rows) as i32;
        let start = rng.gen_range(START_COLUMN_MARGIN..config.cols - START_COLUMN_MARGIN) as i32;

        // Head is the rightmost cell since the snake starts heading right
        let snake = Snake::from_segments(
            (0..INITIAL_SNAKE_LENGTH as i32)
                .rev()
                .map(|offset| Position::new(row, start + offset)),
        );

        let mut state = Self::empty(config, snake, Direction::Right, rng);
        state.add_food();
        state
    }

    fn empty(config: GameConfig, snake: Snake, dir: Direction, rng: StdRng) -> Self {
        let mut grid = Grid::new(config.rows, config.cols);
        for pos in snake.segments() {
            grid.set(pos, GridValue::Snake);
        }

        Self {
            grid,
            snake,
            dir,
            pending: DirectionQueue::new(),
            score: 0,
            lives: config.lives,
            immune_remaining_ms: None,
            time_remaining: config.time_limit_secs,
            mode: GameMode::NotStarted,
            rng,
            config,
        }
    }

    /// Queue a turn for an upcoming tick
    ///
    /// Ignored when two turns are already waiting, or when the turn repeats
    /// or reverses the last queued heading. Returns whether it was queued.
    pub fn change_direction(&mut self, direction: Direction) -> bool {
        self.pending.push(self.dir, direction)
    }

    /// Advance the snake by one cell
    ///
    /// `delay_ms` is the driver's current tick delay; it is what the
    /// immunity window counts down by.
    pub fn move_snake(&mut self, delay_ms: u32) -> MoveOutcome {
        if !self.mode.is_running() {
            return MoveOutcome::Idle;
        }

        if let Some(next) = self.pending.pop() {
            self.dir = next;
        }

        let new_head = self.snake.head().translate(self.dir);
        let hit = self.will_hit(new_head);

        if let Some(remaining) = self.immune_remaining_ms.as_mut() {
            *remaining -= i64::from(delay_ms);
            if *remaining <= 0 {
                self.immune_remaining_ms = None;
            }
        }

        match hit {
            GridValue::Outside | GridValue::Snake => self.collide(hit),
            GridValue::Empty => {
                self.remove_tail();
                self.add_head(new_head);
                MoveOutcome::Moved
            }
            GridValue::Food => {
                self.add_head(new_head);
                self.score += 1;
                debug!(score = self.score, len = self.snake.len(), "food eaten");
                self.add_food();
                MoveOutcome::Ate
            }
        }
    }

    /// Count the round clock down by one second
    ///
    /// The clock only runs while the round is in play. Returns true if the
    /// round ran out of time on this call.
    pub fn tick_clock(&mut self) -> bool {
        if !self.mode.is_running() {
            return false;
        }
        let Some(remaining) = self.time_remaining.as_mut() else {
            return false;
        };

        *remaining = remaining.saturating_sub(1);
        if *remaining == 0 {
            info!(score = self.score, "time is up");
            self.mode = GameMode::Over;
            return true;
        }
        false
    }

    /// Leave the start screen
    pub fn start(&mut self) -> bool {
        self.transition(GameMode::NotStarted, GameMode::Started)
    }

    /// Pause a running round, or ask a paused one to resume
    pub fn toggle_pause(&mut self) -> bool {
        match self.mode {
            GameMode::Started => self.transition(GameMode::Started, GameMode::Paused),
            GameMode::Paused => self.transition(GameMode::Paused, GameMode::Resuming),
            _ => false,
        }
    }

    /// Finish resuming once the driver's countdown is done
    pub fn resume(&mut self) -> bool {
        self.transition(GameMode::Resuming, GameMode::Started)
    }

    fn transition(&mut self, from: GameMode, to: GameMode) -> bool {
        if self.mode != from {
            return false;
        }
        debug!(?from, ?to, "mode change");
        self.mode = to;
        true
    }

    fn collide(&mut self, hit: GridValue) -> MoveOutcome {
        if self.immune_remaining_ms.is_some() {
            return MoveOutcome::Bounced;
        }

        self.lives = self.lives.saturating_sub(1);
        self.immune_remaining_ms = Some(i64::from(self.config.immunity_ms));
        info!(?hit, lives = self.lives, "life lost");

        if self.lives == 0 {
            info!(score = self.score, "out of lives");
            self.mode = GameMode::Over;
            return MoveOutcome::Died;
        }
        MoveOutcome::LostLife {
            lives_left: self.lives,
        }
    }

    fn will_hit(&self, new_head: Position) -> GridValue {
        if !self.grid.contains(new_head) {
            return GridValue::Outside;
        }
        // The tail leaves its cell on this same tick
        if new_head == self.snake.tail() {
            return GridValue::Empty;
        }
        self.grid.get(new_head)
    }

    fn add_head(&mut self, pos: Position) {
        self.snake.push_head(pos);
        self.grid.set(pos, GridValue::Snake);
    }

    fn remove_tail(&mut self) {
        if let Some(tail) = self.snake.pop_tail() {
            self.grid.set(tail, GridValue::Empty);
        }
    }

    fn add_food(&mut self) {
        let empty: Vec<Position> = self.grid.positions_of(GridValue::Empty).collect();
        if let Some(&pos) = empty.choose(&mut self.rng) {
            self.grid.set(pos, GridValue::Food);
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn cell(&self, pos: Position) -> GridValue {
        self.grid.get(pos)
    }

    pub fn head_position(&self) -> Position {
        self.snake.head()
    }

    pub fn tail_position(&self) -> Position {
        self.snake.tail()
    }

    /// Snake segments, head first
    pub fn snake_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.snake.segments()
    }

    pub fn snake_len(&self) -> usize {
        self.snake.len()
    }

    pub fn food_position(&self) -> Option<Position> {
        self.grid.positions_of(GridValue::Food).next()
    }

    pub fn direction(&self) -> Direction {
        self.dir
    }

    pub fn pending_directions(&self) -> impl Iterator<Item = Direction> + '_ {
        self.pending.iter()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn is_immune(&self) -> bool {
        self.immune_remaining_ms.is_some()
    }

    pub fn time_remaining(&self) -> Option<u32> {
        self.time_remaining
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }
}

#[cfg(test)]
impl GameState {
    /// Build a running round with an exact layout, segments head first
    pub(crate) fn from_layout(
        config: GameConfig,
        segments: &[(i32, i32)],
        food: Option<(i32, i32)>,
        dir: Direction,
    ) -> Self {
        let snake = Snake::from_segments(segments.iter().map(|&(r, c)| Position::new(r, c)));
        let mut state = Self::empty(config, snake, dir, StdRng::seed_from_u64(7));
        if let Some((r, c)) = food {
            state.grid.set(Position::new(r, c), GridValue::Food);
        }
        state.mode = GameMode::Started;
        state
    }

    pub(crate) fn assert_consistent(&self) {
        let body: Vec<Position> = self.snake_positions().collect();
        for (i, pos) in body.iter().enumerate() {
            assert_eq!(self.cell(*pos), GridValue::Snake, "segment {i} at {pos:?}");
            assert!(!body[..i].contains(pos), "duplicate segment {pos:?}");
        }
        assert_eq!(self.grid.positions_of(GridValue::Snake).count(), body.len());
        assert!(self.grid.positions_of(GridValue::Food).count() <= 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: u32 = 45;

    fn seeded(config: GameConfig, seed: u64) -> GameState {
        GameState::with_rng(config, StdRng::seed_from_u64(seed)).expect("valid config")
    }

    fn running(config: GameConfig, seed: u64) -> GameState {
        let mut state = seeded(config, seed);
        assert!(state.start());
        state
    }

    #[test]
    fn test_initial_layout() {
        for seed in 0..50 {
            let state = seeded(GameConfig::default(), seed);
            let body: Vec<Position> = state.snake_positions().collect();

            assert_eq!(body.len(), 3);
            let head = body[0];
            assert_eq!(body[1], Position::new(head.row, head.col - 1));
            assert_eq!(body[2], Position::new(head.row, head.col - 2));
            assert!((3..12).contains(&body[2].col));
            assert_eq!(state.direction(), Direction::Right);
            assert_eq!(state.mode(), GameMode::NotStarted);
            assert_eq!(state.lives(), 3);
            assert_eq!(state.score(), 0);
            assert_eq!(state.time_remaining(), Some(63));
            assert!(state.food_position().is_some());
            state.assert_consistent();
        }
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        assert!(GameState::new(GameConfig::new(0, 15)).is_err());
        assert!(GameState::new(GameConfig::new(15, 5)).is_err());
        assert!(GameState::new(GameConfig::default().with_lives(0)).is_err());
        assert!(GameState::new(GameConfig::new(usize::MAX / 4, 8)).is_err());
    }

    #[test]
    fn test_first_move_right() {
        let mut state = GameState::from_layout(
            GameConfig::default(),
            &[(7, 6), (7, 5), (7, 4)],
            Some((0, 0)),
            Direction::Right,
        );

        assert_eq!(state.move_snake(DELAY), MoveOutcome::Moved);
        assert_eq!(state.head_position(), Position::new(7, 7));
        assert_eq!(state.tail_position(), Position::new(7, 5));
        assert_eq!(state.cell(Position::new(7, 4)), GridValue::Empty);
        assert_eq!(state.snake_len(), 3);
        state.assert_consistent();
    }

    #[test]
    fn test_random_start_first_move() {
        let mut plain_moves = 0;
        for seed in 0..20 {
            let mut state = running(GameConfig::default(), seed);
            let head = state.head_position();
            let tail = state.tail_position();
            let ahead = head.translate(Direction::Right);

            // The start column leaves room ahead, only food can be there
            match state.cell(ahead) {
                GridValue::Empty => {
                    assert_eq!(state.move_snake(DELAY), MoveOutcome::Moved);
                    assert_eq!(state.cell(tail), GridValue::Empty);
                    assert_eq!(state.snake_len(), 3);
                    plain_moves += 1;
                }
                GridValue::Food => {
                    assert_eq!(state.move_snake(DELAY), MoveOutcome::Ate);
                    assert_eq!(state.cell(tail), GridValue::Snake);
                    assert_eq!(state.snake_len(), 4);
                }
                other => panic!("unexpected {other:?} ahead of the starting head"),
            }
            assert_eq!(state.head_position(), ahead);
            state.assert_consistent();
        }
        assert!(plain_moves > 0);
    }

    #[test]
    fn test_moves_only_while_started() {
        let mut state = seeded(GameConfig::default(), 3);
        let head = state.head_position();
        assert_eq!(state.move_snake(DELAY), MoveOutcome::Idle);
        assert_eq!(state.head_position(), head);

        state.start();
        state.toggle_pause();
        assert_eq!(state.mode(), GameMode::Paused);
        assert_eq!(state.move_snake(DELAY), MoveOutcome::Idle);

        state.toggle_pause();
        assert_eq!(state.mode(), GameMode::Resuming);
        assert_eq!(state.move_snake(DELAY), MoveOutcome::Idle);
        assert_eq!(state.head_position(), head);

        assert!(state.resume());
        assert_eq!(state.mode(), GameMode::Started);
        assert!(!state.start());
    }

    #[test]
    fn test_queued_turns_apply_one_per_tick() {
        let mut state = GameState::from_layout(
            GameConfig::default(),
            &[(7, 6), (7, 5), (7, 4)],
            None,
            Direction::Right,
        );

        assert!(state.change_direction(Direction::Up));
        assert!(state.change_direction(Direction::Left));
        assert!(!state.change_direction(Direction::Down));
        assert_eq!(state.pending_directions().count(), 2);

        state.move_snake(DELAY);
        assert_eq!(state.direction(), Direction::Up);
        assert_eq!(state.head_position(), Position::new(6, 6));

        state.move_snake(DELAY);
        assert_eq!(state.direction(), Direction::Left);
        assert_eq!(state.head_position(), Position::new(6, 5));

        state.move_snake(DELAY);
        assert_eq!(state.direction(), Direction::Left);
        assert_eq!(state.head_position(), Position::new(6, 4));
        state.assert_consistent();
    }

    #[test]
    fn test_reverse_is_never_queued() {
        let mut state = GameState::from_layout(
            GameConfig::default(),
            &[(7, 6), (7, 5), (7, 4)],
            None,
            Direction::Right,
        );
        assert!(!state.change_direction(Direction::Left));
        assert!(!state.change_direction(Direction::Right));
        assert_eq!(state.move_snake(DELAY), MoveOutcome::Moved);
        assert_eq!(state.lives(), 3);
    }

    #[test]
    fn test_chasing_tail_in_closed_loop() {
        // Four segments filling a 2x2 square, head next to tail
        let mut state = GameState::from_layout(
            GameConfig::default(),
            &[(1, 1), (1, 2), (0, 2), (0, 1)],
            None,
            Direction::Left,
        );

        let turns = [
            Direction::Up,
            Direction::Right,
            Direction::Down,
            Direction::Left,
        ];
        for turn in turns.iter().cycle().take(12) {
            state.change_direction(*turn);
            assert_eq!(state.move_snake(DELAY), MoveOutcome::Moved);
            assert_eq!(state.lives(), 3);
            assert!(!state.is_immune());
            state.assert_consistent();
        }
        assert_eq!(state.snake_len(), 4);
    }

    #[test]
    fn test_short_snake_may_enter_its_tail() {
        let mut state = GameState::from_layout(
            GameConfig::default(),
            &[(4, 5), (4, 4)],
            None,
            Direction::Left,
        );
        assert_eq!(state.move_snake(DELAY), MoveOutcome::Moved);
        assert_eq!(state.head_position(), Position::new(4, 4));
        assert_eq!(state.tail_position(), Position::new(4, 5));

        let mut single = GameState::from_layout(
            GameConfig::default(),
            &[(4, 5)],
            None,
            Direction::Down,
        );
        assert_eq!(single.move_snake(DELAY), MoveOutcome::Moved);
        assert_eq!(single.head_position(), Position::new(5, 5));
        assert_eq!(single.head_position(), single.tail_position());
        single.assert_consistent();
    }

    #[test]
    fn test_eating_until_grid_is_full() {
        // One row of seven: five snake cells, food, one empty cell
        let mut state = GameState::from_layout(
            GameConfig::new(1, 7),
            &[(0, 4), (0, 3), (0, 2), (0, 1), (0, 0)],
            Some((0, 5)),
            Direction::Right,
        );

        assert_eq!(state.move_snake(DELAY), MoveOutcome::Ate);
        assert_eq!(state.score(), 1);
        assert_eq!(state.snake_len(), 6);
        assert_eq!(state.food_position(), Some(Position::new(0, 6)));
        state.assert_consistent();

        assert_eq!(state.move_snake(DELAY), MoveOutcome::Ate);
        assert_eq!(state.score(), 2);
        assert_eq!(state.snake_len(), 7);
        assert_eq!(state.food_position(), None);
        assert_eq!(state.grid().positions_of(GridValue::Empty).count(), 0);
        state.assert_consistent();
    }

    #[test]
    fn test_immunity_window() {
        let mut state = GameState::from_layout(
            GameConfig::new(1, 7),
            &[(0, 6), (0, 5), (0, 4)],
            None,
            Direction::Right,
        );

        assert_eq!(state.move_snake(DELAY), MoveOutcome::LostLife { lives_left: 2 });
        assert!(state.is_immune());
        assert_eq!(state.head_position(), Position::new(0, 6));

        // 200ms window, 45ms ticks: four more hits are absorbed
        for _ in 0..4 {
            assert_eq!(state.move_snake(DELAY), MoveOutcome::Bounced);
            assert_eq!(state.lives(), 2);
            assert_eq!(state.head_position(), Position::new(0, 6));
        }

        assert_eq!(state.move_snake(DELAY), MoveOutcome::LostLife { lives_left: 1 });
        assert!(state.is_immune());
        state.assert_consistent();
    }

    #[test]
    fn test_slow_ticks_clear_immunity_at_once() {
        let mut state = GameState::from_layout(
            GameConfig::new(1, 7),
            &[(0, 6), (0, 5), (0, 4)],
            None,
            Direction::Right,
        );
        state.move_snake(300);
        assert_eq!(state.lives(), 2);
        state.move_snake(300);
        assert_eq!(state.lives(), 1);
    }

    #[test]
    fn test_self_collision_costs_a_life() {
        let mut state = GameState::from_layout(
            GameConfig::default(),
            &[(1, 1), (1, 2), (2, 2), (2, 1), (2, 0)],
            None,
            Direction::Left,
        );
        state.change_direction(Direction::Down);
        assert_eq!(state.move_snake(DELAY), MoveOutcome::LostLife { lives_left: 2 });
        assert_eq!(state.snake_len(), 5);
        assert_eq!(state.head_position(), Position::new(1, 1));
        state.assert_consistent();
    }

    #[test]
    fn test_game_over_happens_once() {
        let mut state = GameState::from_layout(
            GameConfig::new(1, 7).with_lives(2),
            &[(0, 6), (0, 5), (0, 4)],
            Some((0, 0)),
            Direction::Right,
        );

        let outcomes: Vec<MoveOutcome> = (0..20).map(|_| state.move_snake(300)).collect();
        assert_eq!(outcomes[0], MoveOutcome::LostLife { lives_left: 1 });
        assert_eq!(outcomes[1], MoveOutcome::Died);
        assert!(outcomes[2..].iter().all(|o| *o == MoveOutcome::Idle));
        assert_eq!(
            outcomes.iter().filter(|o| **o == MoveOutcome::Died).count(),
            1
        );

        assert_eq!(state.mode(), GameMode::Over);
        assert_eq!(state.lives(), 0);
        assert_eq!(state.score(), 0);
        assert_eq!(state.snake_len(), 3);
        assert!(!state.toggle_pause());
    }

    #[test]
    fn test_time_limit_ends_round() {
        let mut state = seeded(GameConfig::default().with_time_limit(Some(2)), 5);

        assert!(!state.tick_clock());
        assert_eq!(state.time_remaining(), Some(2));

        state.start();
        assert!(!state.tick_clock());
        assert_eq!(state.time_remaining(), Some(1));

        state.toggle_pause();
        assert!(!state.tick_clock());
        assert_eq!(state.time_remaining(), Some(1));
        state.toggle_pause();
        state.resume();

        assert!(state.tick_clock());
        assert_eq!(state.mode(), GameMode::Over);
        assert_eq!(state.lives(), 3);
        assert!(!state.tick_clock());
        assert_eq!(state.move_snake(DELAY), MoveOutcome::Idle);
    }

    #[test]
    fn test_no_time_limit() {
        let mut state = running(GameConfig::default().with_time_limit(None), 5);
        for _ in 0..1000 {
            assert!(!state.tick_clock());
        }
        assert_eq!(state.mode(), GameMode::Started);
        assert_eq!(state.time_remaining(), None);
    }

    #[test]
    fn test_next_round_is_fresh() {
        let mut state = GameState::from_layout(
            GameConfig::new(1, 7).with_lives(1),
            &[(0, 6), (0, 5), (0, 4)],
            None,
            Direction::Right,
        );
        state.change_direction(Direction::Up);
        state.move_snake(DELAY);
        state.change_direction(Direction::Left);
        state.move_snake(DELAY);
        assert!(state.mode().is_over());

        let next = state.next_round();
        assert_eq!(next.mode(), GameMode::NotStarted);
        assert_eq!(next.lives(), 1);
        assert_eq!(next.score(), 0);
        assert_eq!(next.direction(), Direction::Right);
        assert_eq!(next.pending_directions().count(), 0);
        assert_eq!(next.config(), state.config());
        next.assert_consistent();
    }

    #[test]
    fn test_long_random_play_keeps_invariants() {
        let dirs = [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ];
        for seed in 0..10 {
            let config = GameConfig::new(8, 8).with_lives(5).with_time_limit(None);
            let mut state = running(config, seed);
            let mut rng = StdRng::seed_from_u64(seed + 100);

            for _ in 0..400 {
                if rng.gen_bool(0.3) {
                    state.change_direction(dirs[rng.gen_range(0..dirs.len())]);
                }
                let before = (state.score(), state.snake_len());
                let outcome = state.move_snake(DELAY);
                state.assert_consistent();
                assert!(state.pending_directions().count() <= 2);

                match outcome {
                    MoveOutcome::Ate => {
                        assert_eq!(state.score(), before.0 + 1);
                        assert_eq!(state.snake_len(), before.1 + 1);
                    }
                    _ => {
                        assert_eq!(state.score(), before.0);
                        assert_eq!(state.snake_len(), before.1);
                    }
                }
                if state.mode().is_over() {
                    break;
                }
            }
        }
    }
}
