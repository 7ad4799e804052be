//! Q-learning hyperparameter configuration

use serde::{Deserialize, Serialize};

use super::encoder::StateEncoder;
use crate::error::{Error, Result};
use crate::game::TerminationReason;

/// Shaping rewards applied when replaying a finished episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardConfig {
    /// Reward when the food position changed between two steps (food eaten)
    ///
    /// Default: 10.0
    pub food: f64,

    /// Reward when the snake got closer to the food on at least one axis
    ///
    /// Default: 0.001
    pub closer: f64,

    /// Reward for any other interior step
    ///
    /// Default: -0.001
    pub farther: f64,

    /// Terminal penalty for hitting a wall or the body
    ///
    /// Default: -30.0
    pub collision_penalty: f64,

    /// Terminal penalty for starving
    ///
    /// Default: -3.0
    pub starvation_penalty: f64,
}

impl RewardConfig {
    /// Terminal penalty for the given reason
    pub fn penalty(&self, reason: TerminationReason) -> f64 {
        match reason {
            TerminationReason::Wall | TerminationReason::Tail => self.collision_penalty,
            TerminationReason::Steps => self.starvation_penalty,
        }
    }
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            food: 10.0,
            closer: 0.001,
            farther: -0.001,
            collision_penalty: -30.0,
            starvation_penalty: -3.0,
        }
    }
}

/// Configuration for the tabular Q-learning agent
///
/// # Example
///
/// ```rust
/// use q_snake::rl::{QLearningConfig, StateEncoder};
///
/// let config = QLearningConfig {
///     encoder: StateEncoder::Naive,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QLearningConfig {
    /// Exploration rate for epsilon-greedy selection
    ///
    /// Default: 0.02
    pub epsilon: f64,

    /// Learning rate (alpha)
    ///
    /// Default: 0.03
    pub learning_rate: f64,

    /// Discount factor for future rewards (gamma)
    ///
    /// Default: 0.9
    pub discount: f64,

    /// State representation used to build Q-table keys
    ///
    /// Default: basic
    pub encoder: StateEncoder,

    /// Reward shaping constants
    pub rewards: RewardConfig,
}

impl QLearningConfig {
    /// Validate configuration parameters
    ///
    /// All of epsilon, learning rate and discount must lie in [0, 1].
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("epsilon", self.epsilon),
            ("learning_rate", self.learning_rate),
            ("discount", self.discount),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::invalid_config(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }

        Ok(())
    }
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.02,
            learning_rate: 0.03,
            discount: 0.9,
            encoder: StateEncoder::Basic,
            rewards: RewardConfig::default(),
        }
    }
}
