//! Q-Snake - Snake learned with tabular Q-learning
//!
//! This library provides:
//! - Core game logic (game module)
//! - State encoding, Q-table, agent and episode loop (rl module)
//! - Headless and terminal renderers (render module)
//! - Training and evaluation drivers (modes module)

pub mod error;
pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod rl;

pub use error::{Error, Result};
