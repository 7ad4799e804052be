//! State encoders turning raw observations into Q-table keys
//!
//! Two strategies exist:
//!
//! - `basic`: food direction relative to the head, a danger flag for each of
//!   the four neighbouring cells, and the current heading. Small state space.
//! - `naive`: raw food coordinates and the heading, with no danger
//!   information. Kept as a baseline that generalises poorly.
//!
//! Every key starts with the strategy name, so tables trained with different
//! strategies can never alias.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::game::{Direction, GameConfig, Observation, Position};

/// Discrete, strategy-tagged state used to index the Q-table
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateKey(String);

impl StateKey {
    fn tagged(encoder: StateEncoder, body: String) -> Self {
        Self(format!("{}:{}", encoder.name(), body))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the food lies along one axis, relative to the head
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisRelation {
    /// Food has a smaller coordinate (left or above)
    Negative,
    /// Food has a larger coordinate (right or below)
    Positive,
    /// Same coordinate
    Aligned,
}

impl AxisRelation {
    fn of(delta: i32) -> Self {
        match delta {
            d if d > 0 => AxisRelation::Positive,
            d if d < 0 => AxisRelation::Negative,
            _ => AxisRelation::Aligned,
        }
    }

    fn x_label(self) -> &'static str {
        match self {
            AxisRelation::Negative => "0",
            AxisRelation::Positive => "1",
            AxisRelation::Aligned => "NA",
        }
    }

    fn y_label(self) -> &'static str {
        match self {
            AxisRelation::Negative => "2",
            AxisRelation::Positive => "3",
            AxisRelation::Aligned => "NA",
        }
    }
}

/// Per-axis food position relative to the head
pub fn food_relation(head: Position, food: Position) -> (AxisRelation, AxisRelation) {
    (
        AxisRelation::of(food.x - head.x),
        AxisRelation::of(food.y - head.y),
    )
}

/// Output of an encoder: the table key plus the fields reward shaping needs
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedState {
    pub key: StateKey,
    /// Per-axis distance used to judge progress between steps
    ///
    /// For `basic` this is the head-to-food offset; `naive` stores the raw
    /// head coordinates instead.
    pub distance: (i32, i32),
    pub food: Position,
}

/// Encoding strategy, fixed for the lifetime of an agent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateEncoder {
    #[default]
    Basic,
    Naive,
}

impl StateEncoder {
    pub const ALL: [StateEncoder; 2] = [StateEncoder::Basic, StateEncoder::Naive];

    /// Identifier embedded in every key this strategy produces
    pub fn name(&self) -> &'static str {
        match self {
            StateEncoder::Basic => "basic",
            StateEncoder::Naive => "naive",
        }
    }

    /// Encode raw game geometry
    ///
    /// `snake` is ordered tail first with the head last. Identical inputs always
    /// produce identical output.
    ///
    /// # Panics
    ///
    /// Panics if `snake` is empty.
    pub fn encode(
        &self,
        direction: Direction,
        snake: &[Position],
        food: Position,
        width: i32,
        height: i32,
        block_size: i32,
    ) -> EncodedState {
        let head = snake[snake.len() - 1];

        match self {
            StateEncoder::Basic => {
                let (rel_x, rel_y) = food_relation(head, food);
                let surroundings = surroundings(head, snake, width, height, block_size);
                let body = format!(
                    "('{}', '{}', '{}', {})",
                    rel_x.x_label(),
                    rel_y.y_label(),
                    surroundings,
                    direction.index()
                );

                EncodedState {
                    key: StateKey::tagged(*self, body),
                    distance: (food.x - head.x, food.y - head.y),
                    food,
                }
            }
            StateEncoder::Naive => {
                let body = format!("('{}', '{}', 'NA', {})", food.x, food.y, direction.index());

                EncodedState {
                    key: StateKey::tagged(*self, body),
                    distance: (head.x, head.y),
                    food,
                }
            }
        }
    }

    /// Encode an environment observation on the configured board
    pub fn encode_observation(&self, observation: &Observation, config: &GameConfig) -> EncodedState {
        self.encode(
            observation.direction,
            &observation.snake,
            observation.food,
            config.display_width,
            config.display_height,
            config.block_size,
        )
    }
}

impl fmt::Display for StateEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StateEncoder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|encoder| encoder.name() == s)
            .ok_or_else(|| Error::UnknownEncoder {
                name: s.to_string(),
                expected: Self::ALL.map(|e| e.name()).join(", "),
            })
    }
}

/// Danger flags for the cells left, right, above and below the head
///
/// A cell is dangerous when it is off the board or covered by the body.
fn surroundings(
    head: Position,
    snake: &[Position],
    width: i32,
    height: i32,
    block_size: i32,
) -> String {
    let body: HashSet<Position> = snake[..snake.len() - 1].iter().copied().collect();

    Direction::ALL
        .iter()
        .map(|&dir| {
            let cell = head.stepped(dir, block_size);
            let off_board = cell.x < 0 || cell.y < 0 || cell.x >= width || cell.y >= height;
            if off_board || body.contains(&cell) {
                '1'
            } else {
                '0'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(encoder: StateEncoder, snake: &[Position], food: Position) -> EncodedState {
        encoder.encode(Direction::Right, snake, food, 600, 400, 10)
    }

    #[test]
    fn test_aligned_y_on_centred_board() {
        let head = Position::new(300, 200);
        let food = Position::new(450, 200);

        let (rel_x, rel_y) = food_relation(head, food);
        assert_eq!(rel_x, AxisRelation::Positive);
        assert_eq!(rel_y, AxisRelation::Aligned);

        let state = encode(StateEncoder::Basic, &[head], food);
        assert_eq!(state.key.as_str(), "basic:('1', 'NA', '0000', 1)");
        assert_eq!(state.distance, (150, 0));
        assert_eq!(state.food, food);
    }

    #[test]
    fn test_food_relation_categories() {
        let head = Position::new(50, 50);
        assert_eq!(
            food_relation(head, Position::new(10, 90)),
            (AxisRelation::Negative, AxisRelation::Positive)
        );
        assert_eq!(
            food_relation(head, Position::new(50, 10)),
            (AxisRelation::Aligned, AxisRelation::Negative)
        );
    }

    #[test]
    fn test_danger_from_walls() {
        let state = encode(StateEncoder::Basic, &[Position::new(0, 0)], Position::new(50, 50));
        assert_eq!(state.key.as_str(), "basic:('1', '3', '1010', 1)");

        let state = encode(
            StateEncoder::Basic,
            &[Position::new(590, 390)],
            Position::new(50, 50),
        );
        assert_eq!(state.key.as_str(), "basic:('0', '2', '0101', 1)");
    }

    #[test]
    fn test_danger_from_body() {
        let snake = [
            Position::new(100, 110),
            Position::new(90, 110),
            Position::new(90, 100),
            Position::new(100, 100),
        ];
        let state = encode(StateEncoder::Basic, &snake, Position::new(300, 100));
        // left (90,100) and down (100,110) are body
        assert_eq!(state.key.as_str(), "basic:('1', 'NA', '1001', 1)");
    }

    #[test]
    fn test_naive_uses_raw_coordinates() {
        let snake = [Position::new(290, 200), Position::new(300, 200)];
        let state = encode(StateEncoder::Naive, &snake, Position::new(40, 70));

        assert_eq!(state.key.as_str(), "naive:('40', '70', 'NA', 1)");
        assert_eq!(state.distance, (300, 200));
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let snake = [Position::new(200, 200), Position::new(210, 200)];
        let food = Position::new(30, 370);

        for encoder in StateEncoder::ALL {
            let a = encode(encoder, &snake, food);
            let b = encode(encoder, &snake, food);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_strategies_never_share_keys() {
        let heads = [Position::new(0, 0), Position::new(300, 200), Position::new(590, 390)];
        let foods = [Position::new(0, 0), Position::new(40, 200), Position::new(300, 10)];

        for head in heads {
            for food in foods {
                let basic = encode(StateEncoder::Basic, &[head], food);
                let naive = encode(StateEncoder::Naive, &[head], food);
                assert_ne!(basic.key, naive.key);
                assert!(basic.key.as_str().starts_with("basic:"));
                assert!(naive.key.as_str().starts_with("naive:"));
            }
        }
    }

    #[test]
    fn test_encoder_from_str() {
        assert_eq!("basic".parse::<StateEncoder>().unwrap(), StateEncoder::Basic);
        assert_eq!("naive".parse::<StateEncoder>().unwrap(), StateEncoder::Naive);

        let err = "fancy".parse::<StateEncoder>().unwrap_err();
        assert!(matches!(err, Error::UnknownEncoder { ref name, .. } if name == "fancy"));
        assert!(err.to_string().contains("basic, naive"));
    }

    #[test]
    fn test_encode_observation_matches_encode() {
        let config = GameConfig::new(600, 400, 10);
        let obs = Observation {
            snake: vec![Position::new(300, 200)],
            food: Position::new(450, 200),
            direction: Direction::Up,
            steps: 0,
            steps_since_food: 0,
        };

        let state = StateEncoder::Basic.encode_observation(&obs, &config);
        assert_eq!(state.key.as_str(), "basic:('1', 'NA', '0000', 2)");
    }
}
