//! Renderers observing the episode loop
//!
//! The episode loop asks its renderer before every step whether it may
//! continue, and hands it every observation after a step. Rendering never
//! influences the game itself; it can only stop the current episode.

pub mod headless;
pub mod renderer;
pub mod terminal;

pub use headless::HeadlessRenderer;
pub use renderer::BoardView;
pub use terminal::TerminalRenderer;

use crate::error::Result;
use crate::game::Observation;

/// Whether the episode loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Abort,
}

/// Presentation and control hook for the episode loop
pub trait Renderer {
    /// Called once before the first step of an episode
    fn begin_episode(&mut self, _episode: usize) -> Result<()> {
        Ok(())
    }

    /// Checked before every step; `Abort` stops the episode without learning
    fn poll(&mut self) -> Result<Flow>;

    /// Present the observation produced by the latest step
    fn render(&mut self, observation: &Observation) -> Result<Flow>;

    /// Called once after an episode that ran to completion
    fn end_episode(&mut self, _score: u32) {}
}
