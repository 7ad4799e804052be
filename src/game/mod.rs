//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! It is driven programmatically by the Q-learning environment.

pub mod action;
pub mod config;
pub mod engine;
pub mod state;

// Re-export commonly used types
pub use action::{ACTION_COUNT, Direction};
pub use config::GameConfig;
pub use engine::{GameEngine, StepResult};
pub use state::{GameState, Observation, Position, Snake, TerminationReason};
