use crate::error::Result;
use crate::game::{Direction, GameConfig, GameEngine, GameState, Observation, TerminationReason};

/// Snake environment for reinforcement learning
///
/// Wraps the game engine and exposes the standard RL interface:
/// - Raw observations (body, food, heading, counters)
/// - Discrete action space (4 actions: Left, Right, Up, Down)
/// - `reset` / `step`
pub struct SnakeEnvironment {
    engine: GameEngine,
    state: GameState,
}

impl SnakeEnvironment {
    /// Create a new environment around an engine and start the first game
    pub fn new(mut engine: GameEngine) -> Self {
        let state = engine.reset();
        Self { engine, state }
    }

    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::new(GameEngine::with_seed(config, seed))
    }

    /// Start a new game and return its initial observation
    pub fn reset(&mut self) -> Observation {
        self.state = self.engine.reset();
        self.state.observation()
    }

    /// Step the environment with a discrete action
    ///
    /// Actions follow `Direction::index`: 0 Left, 1 Right, 2 Up, 3 Down.
    ///
    /// Returns: (observation, done, reason)
    pub fn step(
        &mut self,
        action_idx: usize,
    ) -> Result<(Observation, bool, Option<TerminationReason>)> {
        let direction = Direction::from_index(action_idx)?;
        let result = self.engine.step(&mut self.state, direction);

        Ok((self.state.observation(), result.terminated, result.reason))
    }

    /// Current observation without stepping
    pub fn observation(&self) -> Observation {
        self.state.observation()
    }

    pub fn config(&self) -> &GameConfig {
        self.engine.config()
    }

    /// Current game state (for testing/debugging)
    pub fn state(&self) -> &GameState {
        &self.state
    }
}
