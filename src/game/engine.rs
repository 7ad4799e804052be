use rand::{Rng, SeedableRng, rngs::StdRng};

use super::{
    action::Direction,
    config::GameConfig,
    state::{GameState, Position, Snake, TerminationReason},
};

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Whether the game has terminated
    pub terminated: bool,
    /// Why the game terminated, if it did
    pub reason: Option<TerminationReason>,
    /// Whether the snake ate food this step
    pub ate_food: bool,
}

/// The game engine that handles all game logic
pub struct GameEngine {
    config: GameConfig,
    rng: StdRng,
}

impl GameEngine {
    /// Create a new game engine drawing food positions from `rng`
    pub fn new(config: GameConfig, rng: StdRng) -> Self {
        Self { config, rng }
    }

    /// Create an engine with a deterministic food sequence
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::new(config, StdRng::seed_from_u64(seed))
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Reset the game to initial state: a one-segment snake at the board
    /// centre heading right
    pub fn reset(&mut self) -> GameState {
        let block = self.config.block_size;
        let center = Position::new(
            self.config.columns() / 2 * block,
            self.config.rows() / 2 * block,
        );

        let snake = Snake::new(center);
        let food = self.spawn_food(&snake);

        GameState::new(snake, food, Direction::Right)
    }

    /// Execute one step of the game
    ///
    /// Checks run in a fixed order: starvation budget, wall, body, food.
    pub fn step(&mut self, state: &mut GameState, direction: Direction) -> StepResult {
        if let Some(reason) = state.termination {
            return StepResult {
                terminated: true,
                reason: Some(reason),
                ate_food: false,
            };
        }

        state.steps += 1;
        state.steps_since_food += 1;

        if state.steps_since_food >= self.config.max_steps_since_food {
            return Self::terminate(state, TerminationReason::Steps);
        }

        let new_head = state.snake.head().stepped(direction, self.config.block_size);

        if !self.is_in_bounds(new_head) {
            return Self::terminate(state, TerminationReason::Wall);
        }

        // The tail moves out of the way unless this step grows the snake
        let ate_food = new_head == state.food;
        if state.snake.collides_with_body(new_head, !ate_food) {
            return Self::terminate(state, TerminationReason::Tail);
        }

        state.direction = direction;

        if ate_food {
            state.snake.push_head(new_head);
            state.score += 1;
            state.steps_since_food = 0;
            state.food = self.spawn_food(&state.snake);
        } else {
            // Release the tail first: the head may be taking over that cell
            state.snake.pop_tail();
            state.snake.push_head(new_head);
        }

        StepResult {
            terminated: false,
            reason: None,
            ate_food,
        }
    }

    /// Check if a position is within the board
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0
            && pos.x < self.config.display_width
            && pos.y >= 0
            && pos.y < self.config.display_height
    }

    fn terminate(state: &mut GameState, reason: TerminationReason) -> StepResult {
        state.termination = Some(reason);
        StepResult {
            terminated: true,
            reason: Some(reason),
            ate_food: false,
        }
    }

    /// Spawn food at a random grid-aligned cell not covered by the snake
    ///
    /// If the snake covers every cell there is nowhere free to go, so any cell
    /// is accepted.
    fn spawn_food(&mut self, snake: &Snake) -> Position {
        let columns = self.config.columns();
        let rows = self.config.rows();
        let board_full = snake.len() >= (columns * rows) as usize;

        loop {
            let x = self.rng.random_range(0..columns) * self.config.block_size;
            let y = self.rng.random_range(0..rows) * self.config.block_size;
            let pos = Position::new(x, y);

            if board_full || !snake.contains(pos) {
                return pos;
            }
        }
    }
}
