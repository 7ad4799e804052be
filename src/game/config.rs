use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for the game board and its step guard
///
/// Dimensions are expressed in pixels; the board is a grid of
/// `block_size`-sized cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Width of the board
    pub display_width: i32,
    /// Height of the board
    pub display_height: i32,
    /// Size of a single grid cell
    pub block_size: i32,
    /// Steps without eating after which the episode ends by starvation
    pub max_steps_since_food: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            display_width: 1000,
            display_height: 1000,
            block_size: 100,
            max_steps_since_food: 2_000,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom board size
    pub fn new(display_width: i32, display_height: i32, block_size: i32) -> Self {
        Self {
            display_width,
            display_height,
            block_size,
            ..Default::default()
        }
    }

    /// Number of cells along the x axis
    pub fn columns(&self) -> i32 {
        self.display_width / self.block_size
    }

    /// Number of cells along the y axis
    pub fn rows(&self) -> i32 {
        self.display_height / self.block_size
    }

    /// Validate board parameters
    pub fn validate(&self) -> Result<()> {
        if self.block_size <= 0 {
            return Err(Error::invalid_config(format!(
                "block_size must be positive, got {}",
                self.block_size
            )));
        }

        if self.display_width < self.block_size || self.display_height < self.block_size {
            return Err(Error::invalid_config(format!(
                "board {}x{} is smaller than one block of {}",
                self.display_width, self.display_height, self.block_size
            )));
        }

        if self.display_width % self.block_size != 0 || self.display_height % self.block_size != 0
        {
            return Err(Error::invalid_config(format!(
                "board {}x{} is not a multiple of block_size {}",
                self.display_width, self.display_height, self.block_size
            )));
        }

        if self.max_steps_since_food == 0 {
            return Err(Error::invalid_config(
                "max_steps_since_food must be at least 1",
            ));
        }

        Ok(())
    }
}
