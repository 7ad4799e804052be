//! Tabular Q-learning for the Snake environment
//!
//! Provides:
//! - Observation encoders producing strategy-tagged state keys
//! - A lazily grown Q-table with JSON persistence
//! - An epsilon-greedy agent with a batched end-of-episode Bellman update
//! - The episode loop tying environment, agent and renderer together

pub mod agent;
pub mod config;
pub mod encoder;
pub mod environment;
pub mod episode;
pub mod persistence;
pub mod q_table;
pub mod trajectory;

pub use agent::QAgent;
pub use config::{QLearningConfig, RewardConfig};
pub use encoder::{AxisRelation, EncodedState, StateEncoder, StateKey, food_relation};
pub use environment::SnakeEnvironment;
pub use episode::{EpisodeOutcome, run_episode};
pub use persistence::{load_q_table, save_q_table};
pub use q_table::{ActionValues, QTable};
pub use trajectory::{Trajectory, Transition};
