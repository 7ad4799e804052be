//! Tabular Q-learning agent
//!
//! The agent picks actions epsilon-greedily from its Q-table while an episode
//! runs, records every (state, action) pair, and learns only once the episode
//! has finished by replaying the recorded trajectory:
//!
//! 1. If the episode ended for a known reason, the last pair receives the
//!    terminal penalty with no bootstrapped future value.
//! 2. Every consecutive pair (s0, a0) -> s1 then receives a shaped reward and
//!    the one-step update `Q[s0][a0] <- (1-α)Q[s0][a0] + α(r + γ max Q[s1])`.

use rand::{Rng, SeedableRng, rngs::StdRng};

use super::config::QLearningConfig;
use super::encoder::{EncodedState, StateEncoder, StateKey};
use super::q_table::QTable;
use super::trajectory::Trajectory;
use crate::error::Result;
use crate::game::{ACTION_COUNT, Direction, GameConfig, Observation, TerminationReason};

/// Q-learning agent (off-policy TD control, batched per episode)
#[derive(Debug, Clone)]
pub struct QAgent {
    config: QLearningConfig,
    game_config: GameConfig,
    q_table: QTable,
    trajectory: Trajectory,
    epsilon: f64,
    rng: StdRng,
}

impl QAgent {
    /// Create a new agent
    ///
    /// # Arguments
    ///
    /// * `config` - Learning hyperparameters and encoder choice
    /// * `game_config` - Board geometry the encoder needs
    /// * `q_table` - Starting table (empty or loaded from disk)
    /// * `rng` - Source for exploration draws
    pub fn new(
        config: QLearningConfig,
        game_config: GameConfig,
        q_table: QTable,
        rng: StdRng,
    ) -> Result<Self> {
        config.validate()?;
        game_config.validate()?;

        Ok(Self {
            epsilon: config.epsilon,
            config,
            game_config,
            q_table,
            trajectory: Trajectory::new(),
            rng,
        })
    }

    pub fn with_seed(
        config: QLearningConfig,
        game_config: GameConfig,
        q_table: QTable,
        seed: u64,
    ) -> Result<Self> {
        Self::new(config, game_config, q_table, StdRng::seed_from_u64(seed))
    }

    /// Start a new episode
    pub fn reset(&mut self) {
        self.trajectory.clear();
    }

    /// Encode an observation with the configured strategy
    pub fn encode(&self, observation: &Observation) -> EncodedState {
        self.config
            .encoder
            .encode_observation(observation, &self.game_config)
    }

    /// ε-greedy action selection
    ///
    /// Explores uniformly over all actions with probability epsilon, otherwise
    /// takes the greedy action (lowest index on ties).
    pub fn select_action(&mut self, state: &StateKey) -> usize {
        // Touch the row so every visited state exists in the table
        self.q_table.row_mut(state);

        if self.rng.random::<f64>() < self.epsilon {
            self.rng.random_range(0..ACTION_COUNT)
        } else {
            self.q_table.greedy_action(state)
        }
    }

    /// Remember the action taken in a state
    ///
    /// Fails with [`crate::Error::InvalidAction`] if `action` is not a valid index, so
    /// the later update never indexes past a row.
    pub fn record(&mut self, state: EncodedState, action: usize) -> Result<()> {
        Direction::from_index(action)?;
        self.trajectory.push(state, action);
        Ok(())
    }

    /// Learn from the finished episode and clear the trajectory
    ///
    /// # Arguments
    ///
    /// * `reason` - Why the episode ended, or `None` when it was cut short by
    ///   an external step budget
    ///
    /// # Returns
    ///
    /// The total shaped reward of the episode
    pub fn update(&mut self, reason: Option<TerminationReason>) -> f64 {
        let trajectory = std::mem::take(&mut self.trajectory);
        let alpha = self.config.learning_rate;
        let gamma = self.config.discount;
        let mut total_reward = 0.0;

        if let (Some(reason), Some(last)) = (reason, trajectory.last()) {
            let penalty = self.config.rewards.penalty(reason);
            total_reward += penalty;

            // No future state once the game is over
            let value = &mut self.q_table.row_mut(&last.state.key)[last.action];
            *value = (1.0 - alpha) * *value + alpha * penalty;
        }

        for (current, next) in trajectory.pairs() {
            let reward = self.shaped_reward(&current.state, &next.state);
            total_reward += reward;

            let max_next = self.q_table.max_value(&next.state.key);
            let value = &mut self.q_table.row_mut(&current.state.key)[current.action];
            *value = (1.0 - alpha) * *value + alpha * (reward + gamma * max_next);
        }

        total_reward
    }

    /// Reward for moving from `s0` to `s1`
    fn shaped_reward(&self, s0: &EncodedState, s1: &EncodedState) -> f64 {
        let rewards = &self.config.rewards;
        let (x0, y0) = s0.distance;
        let (x1, y1) = s1.distance;

        if s0.food != s1.food {
            rewards.food
        } else if x0.abs() > x1.abs() || y0.abs() > y1.abs() {
            rewards.closer
        } else {
            rewards.farther
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Override the exploration rate (schedules, evaluation)
    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon;
    }

    pub fn encoder(&self) -> StateEncoder {
        self.config.encoder
    }

    pub fn config(&self) -> &QLearningConfig {
        &self.config
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, Position};

    fn agent_with(q_table: QTable, epsilon: f64) -> QAgent {
        let config = QLearningConfig {
            epsilon,
            learning_rate: 0.5,
            discount: 0.9,
            ..Default::default()
        };
        QAgent::with_seed(config, GameConfig::new(100, 100, 10), q_table, 1).unwrap()
    }

    /// Basic-encoded state with the head at `head` and food at `food`
    fn state(head: (i32, i32), food: (i32, i32)) -> EncodedState {
        StateEncoder::Basic.encode(
            Direction::Right,
            &[Position::new(head.0, head.1)],
            Position::new(food.0, food.1),
            100,
            100,
            10,
        )
    }

    #[test]
    fn test_greedy_selection_with_zero_epsilon() {
        let s = state((50, 50), (0, 0));
        let mut table = QTable::new();
        *table.row_mut(&s.key) = [0.1, 0.7, 0.7, -0.2];

        let mut agent = agent_with(table, 0.0);
        for _ in 0..20 {
            assert_eq!(agent.select_action(&s.key), 1);
        }
    }

    #[test]
    fn test_unseen_state_picks_first_action() {
        let s = state((50, 50), (0, 0));
        let mut agent = agent_with(QTable::new(), 0.0);

        assert_eq!(agent.select_action(&s.key), 0);
        assert_eq!(agent.q_table().get(&s.key), Some(&[0.0; ACTION_COUNT]));
    }

    #[test]
    fn test_full_exploration_covers_all_actions() {
        let s = state((50, 50), (0, 0));
        let mut agent = agent_with(QTable::new(), 1.0);

        let mut seen = [false; ACTION_COUNT];
        for _ in 0..200 {
            seen[agent.select_action(&s.key)] = true;
        }
        assert_eq!(seen, [true; ACTION_COUNT]);
    }

    #[test]
    fn test_terminal_update_touches_only_last_pair() {
        let last = state((0, 50), (90, 90));
        let other = state((50, 50), (90, 90));

        let mut table = QTable::new();
        *table.row_mut(&last.key) = [1.0, 2.0, 3.0, 4.0];
        *table.row_mut(&other.key) = [5.0, 6.0, 7.0, 8.0];
        let before = table.clone();

        let mut agent = agent_with(table, 0.0);
        agent.record(last.clone(), 0).unwrap();

        let total = agent.update(Some(TerminationReason::Wall));
        assert_eq!(total, -30.0);

        let old = before.get(&last.key).unwrap()[0];
        let new = agent.q_table().get(&last.key).unwrap()[0];
        assert!((new - old - 0.5 * (-30.0 - old)).abs() < 1e-12);

        assert_eq!(
            &agent.q_table().get(&last.key).unwrap()[1..],
            &before.get(&last.key).unwrap()[1..]
        );
        assert_eq!(agent.q_table().get(&other.key), before.get(&other.key));
        assert_eq!(agent.q_table().len(), before.len());
    }

    #[test]
    fn test_starvation_penalty_is_smaller() {
        let last = state((50, 50), (90, 90));
        let mut agent = agent_with(QTable::new(), 0.0);
        agent.record(last.clone(), 2).unwrap();

        assert_eq!(agent.update(Some(TerminationReason::Steps)), -3.0);
        assert_eq!(agent.q_table().get(&last.key).unwrap()[2], 0.5 * -3.0);
    }

    #[test]
    fn test_interior_updates_use_shaped_rewards() {
        // Food at (90,50): moving right closes the x gap, then food is eaten and
        // respawns elsewhere.
        let s0 = state((50, 50), (90, 50));
        let s1 = state((60, 50), (90, 50));
        let s2 = state((70, 50), (10, 10));
        assert_ne!(s0.key, s2.key);

        let mut agent = agent_with(QTable::new(), 0.0);
        agent.record(s0.clone(), 1).unwrap();
        agent.record(s1.clone(), 1).unwrap();
        agent.record(s2.clone(), 3).unwrap();

        let total = agent.update(None);
        assert!((total - (0.001 + 10.0)).abs() < 1e-12);

        // s0 and s1 share a key (same relative food position, same danger)
        assert_eq!(s0.key, s1.key);
        let q = agent.q_table();
        // First pair: 0.5 * (0.001 + 0.9 * 0) = 0.0005
        // Second pair: 0.5 * 0.0005 + 0.5 * (10 + 0.9 * 0) = 5.00025
        assert!((q.get(&s1.key).unwrap()[1] - 5.00025).abs() < 1e-12);
        // No terminal update without a reason
        assert_eq!(q.get(&s2.key).unwrap(), &[0.0; ACTION_COUNT]);
    }

    #[test]
    fn test_moving_away_is_penalised() {
        let s0 = state((50, 50), (90, 50));
        let s1 = state((40, 50), (90, 50));

        let mut agent = agent_with(QTable::new(), 0.0);
        agent.record(s0.clone(), 0).unwrap();
        agent.record(s1, 0).unwrap();

        assert!((agent.update(None) - -0.001).abs() < 1e-12);
    }

    #[test]
    fn test_terminal_update_runs_before_interior_sweep() {
        let s0 = state((50, 50), (10, 50));
        let s1 = state((50, 40), (10, 50));
        assert_ne!(s0.key, s1.key);

        let mut agent = agent_with(QTable::new(), 0.0);
        agent.record(s0.clone(), 2).unwrap();
        agent.record(s1.clone(), 1).unwrap();

        agent.update(Some(TerminationReason::Tail));

        let q = agent.q_table();
        // s1 row: [0, -15, 0, 0]; max is 0 so s0 only sees the step reward
        assert_eq!(q.get(&s1.key).unwrap()[1], -15.0);
        assert!((q.get(&s0.key).unwrap()[2] - 0.5 * -0.001).abs() < 1e-12);
    }

    #[test]
    fn test_update_clears_trajectory() {
        let mut agent = agent_with(QTable::new(), 0.0);
        agent.record(state((50, 50), (0, 0)), 0).unwrap();
        agent.record(state((40, 50), (0, 0)), 0).unwrap();
        assert_eq!(agent.trajectory().transitions().len(), 2);

        agent.update(None);
        assert!(agent.trajectory().is_empty());
        assert_eq!(agent.update(Some(TerminationReason::Wall)), 0.0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = QLearningConfig {
            discount: 2.0,
            ..Default::default()
        };
        assert!(QAgent::with_seed(config, GameConfig::default(), QTable::new(), 0).is_err());
    }

    #[test]
    fn test_record_rejects_out_of_range_action() {
        let mut agent = agent_with(QTable::new(), 0.0);

        let err = agent.record(state((50, 50), (0, 0)), ACTION_COUNT).unwrap_err();
        assert!(matches!(err, crate::Error::InvalidAction { index: 4, .. }));
        assert!(agent.trajectory().is_empty());

        // Nothing recorded, so the update has nothing to index
        assert_eq!(agent.update(Some(TerminationReason::Wall)), 0.0);
    }
}
