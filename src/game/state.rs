use std::collections::VecDeque;

use super::direction::Direction;

/// A cell on the game grid, addressed by row then column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Move position in a direction
    pub fn translate(&self, direction: Direction) -> Self {
        let (dr, dc) = direction.delta();
        Self {
            row: self.row + dr,
            col: self.col + dc,
        }
    }
}

/// What occupies a grid cell
///
/// `Outside` is never stored; it is what [`Grid::get`] reports for
/// positions beyond the edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridValue {
    #[default]
    Empty,
    Snake,
    Food,
    Outside,
}

/// Fixed-size row-major board
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<GridValue>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![GridValue::Empty; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Check if a position is within the grid bounds
    pub fn contains(&self, pos: Position) -> bool {
        pos.row >= 0
            && pos.row < self.rows as i32
            && pos.col >= 0
            && pos.col < self.cols as i32
    }

    pub fn get(&self, pos: Position) -> GridValue {
        match self.index(pos) {
            Some(idx) => self.cells[idx],
            None => GridValue::Outside,
        }
    }

    /// Store a value; out-of-bounds writes and `Outside` are ignored
    pub(crate) fn set(&mut self, pos: Position, value: GridValue) {
        if value == GridValue::Outside {
            return;
        }
        if let Some(idx) = self.index(pos) {
            self.cells[idx] = value;
        }
    }

    /// Every position holding `value`, in row-major order
    pub fn positions_of(&self, value: GridValue) -> impl Iterator<Item = Position> + '_ {
        self.iter()
            .filter(move |(_, cell)| *cell == value)
            .map(|(pos, _)| pos)
    }

    /// Cell-by-cell enumeration in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (Position, GridValue)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(idx, cell)| {
                let pos = Position::new((idx / cols) as i32, (idx % cols) as i32);
                (pos, *cell)
            })
    }

    fn index(&self, pos: Position) -> Option<usize> {
        self.contains(pos)
            .then(|| pos.row as usize * self.cols + pos.col as usize)
    }
}

/// Snake body, head at the front and tail at the back
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    body: VecDeque<Position>,
}

impl Snake {
    /// Build a snake from segments listed head first
    pub fn from_segments(segments: impl IntoIterator<Item = Position>) -> Self {
        Self {
            body: segments.into_iter().collect(),
        }
    }

    pub fn head(&self) -> Position {
        self.body[0]
    }

    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    pub fn segments(&self) -> impl Iterator<Item = Position> + '_ {
        self.body.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub(crate) fn push_head(&mut self, pos: Position) {
        self.body.push_front(pos);
    }

    pub(crate) fn pop_tail(&mut self) -> Option<Position> {
        self.body.pop_back()
    }
}
