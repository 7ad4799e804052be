use std::collections::{HashSet, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::action::Direction;

/// A position on the board, in pixels (always a multiple of the block size)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move one block in a direction
    pub fn stepped(&self, direction: Direction, block_size: i32) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx * block_size, dy * block_size)
    }
}

/// The snake body
///
/// Segments are ordered tail first, head last. A membership set mirrors the
/// sequence so collision checks are O(1); both are only touched through
/// `push_head` and `pop_tail`, which keep them in sync.
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    body: VecDeque<Position>,
    occupied: HashSet<Position>,
}

impl Snake {
    /// Create a snake of length 1
    pub fn new(head: Position) -> Self {
        Self::from_segments([head])
    }

    /// Build a snake from segments ordered tail to head
    ///
    /// Duplicate positions are dropped so the body stays a set.
    ///
    /// # Panics
    ///
    /// Panics if `segments` is empty.
    pub fn from_segments(segments: impl IntoIterator<Item = Position>) -> Self {
        let mut snake = Self {
            body: VecDeque::new(),
            occupied: HashSet::new(),
        };
        for pos in segments {
            if !snake.contains(pos) {
                snake.push_head(pos);
            }
        }
        assert!(!snake.is_empty(), "a snake needs at least one segment");
        snake
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    /// Get the tail position (oldest segment)
    pub fn tail(&self) -> Position {
        self.body[0]
    }

    /// Check if the position is occupied by any segment
    pub fn contains(&self, pos: Position) -> bool {
        self.occupied.contains(&pos)
    }

    /// Check if moving the head onto `pos` runs into the body
    ///
    /// When `tail_vacates` is set the current tail cell does not count, since it
    /// is released by the same move.
    pub fn collides_with_body(&self, pos: Position, tail_vacates: bool) -> bool {
        if tail_vacates && pos == self.tail() {
            return false;
        }
        self.contains(pos)
    }

    /// Append a new head segment
    ///
    /// `pos` must not already be part of the body; when the head moves onto
    /// the cell the tail is leaving, call `pop_tail` first.
    pub fn push_head(&mut self, pos: Position) {
        self.body.push_back(pos);
        self.occupied.insert(pos);
    }

    /// Remove the tail segment
    pub fn pop_tail(&mut self) -> Option<Position> {
        let tail = self.body.pop_front()?;
        self.occupied.remove(&tail);
        Some(tail)
    }

    /// Iterate over segments, tail first
    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.body.iter()
    }

    /// Snapshot of the segments, tail first
    pub fn to_vec(&self) -> Vec<Position> {
        self.body.iter().copied().collect()
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (never true once constructed)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Why an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminationReason {
    /// Snake left the board
    Wall,
    /// Snake ran into its own body
    Tail,
    /// Snake went too long without eating
    Steps,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationReason::Wall => "Wall",
            TerminationReason::Tail => "Tail",
            TerminationReason::Steps => "Steps",
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable snapshot of the environment handed to encoders and renderers
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Body segments, tail first, head last
    pub snake: Vec<Position>,
    pub food: Position,
    pub direction: Direction,
    /// Steps taken since reset
    pub steps: u32,
    /// Steps taken since the last food was eaten
    pub steps_since_food: u32,
}

impl Observation {
    /// Last body segment
    ///
    /// Observations built by `GameState::observation` always hold at least
    /// one segment; a hand-made empty `snake` panics here.
    pub fn head(&self) -> Position {
        self.snake[self.snake.len() - 1]
    }

    pub fn length(&self) -> usize {
        self.snake.len()
    }

    /// Food eaten so far
    pub fn score(&self) -> u32 {
        (self.snake.len() - 1) as u32
    }
}

/// Complete mutable game state driven by the engine
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    pub food: Position,
    pub direction: Direction,
    /// Food eaten so far
    pub score: u32,
    pub steps: u32,
    pub steps_since_food: u32,
    /// Set once the episode has ended
    pub termination: Option<TerminationReason>,
}

impl GameState {
    /// Create a new game state
    pub fn new(snake: Snake, food: Position, direction: Direction) -> Self {
        Self {
            snake,
            food,
            direction,
            score: 0,
            steps: 0,
            steps_since_food: 0,
            termination: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.termination.is_none()
    }

    /// Take an immutable snapshot for encoders and renderers
    pub fn observation(&self) -> Observation {
        Observation {
            snake: self.snake.to_vec(),
            food: self.food,
            direction: self.direction,
            steps: self.steps,
            steps_since_food: self.steps_since_food,
        }
    }
}
