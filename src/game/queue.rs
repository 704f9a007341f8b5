use std::collections::VecDeque;

use super::direction::Direction;

/// How many turns a player may queue ahead of the snake
pub const MAX_PENDING_TURNS: usize = 2;

/// Bounded FIFO of turns waiting for upcoming ticks
///
/// A turn is accepted only if it changes the heading that will be in force
/// once every already-queued turn has been applied, and does not reverse it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectionQueue {
    pending: VecDeque<Direction>,
}

impl DirectionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Heading after all queued turns, falling back to `current`
    fn last_or(&self, current: Direction) -> Direction {
        self.pending.back().copied().unwrap_or(current)
    }

    fn can_push(&self, current: Direction, direction: Direction) -> bool {
        if self.pending.len() >= MAX_PENDING_TURNS {
            return false;
        }
        let last = self.last_or(current);
        direction != last && !last.is_opposite(direction)
    }

    /// Queue a turn; returns whether it was accepted
    pub fn push(&mut self, current: Direction, direction: Direction) -> bool {
        if !self.can_push(current, direction) {
            return false;
        }
        self.pending.push_back(direction);
        true
    }

    pub fn pop(&mut self) -> Option<Direction> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        self.pending.iter().copied()
    }
}
