use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Number of actions the agent can choose from
pub const ACTION_COUNT: usize = 4;

/// Direction the snake can move
///
/// The discriminant order doubles as the action index used by the Q-table:
/// 0 = Left, 1 = Right, 2 = Up, 3 = Down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// All directions in action-index order
    pub const ALL: [Direction; ACTION_COUNT] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Returns the unit delta (dx, dy) for moving in this direction
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }

    /// Action index of this direction
    pub fn index(&self) -> usize {
        match self {
            Direction::Left => 0,
            Direction::Right => 1,
            Direction::Up => 2,
            Direction::Down => 3,
        }
    }

    /// Convert an action index back into a direction
    ///
    /// Only the agent emits action indices, so an out-of-range value means an
    /// internal invariant was broken.
    pub fn from_index(index: usize) -> Result<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(Error::InvalidAction {
                index,
                count: ACTION_COUNT,
            })
    }
}

impl TryFrom<usize> for Direction {
    type Error = Error;

    fn try_from(index: usize) -> Result<Self> {
        Self::from_index(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_delta() {
        assert_eq!(Direction::Left.delta(), (-1, 0));
        assert_eq!(Direction::Right.delta(), (1, 0));
        assert_eq!(Direction::Up.delta(), (0, -1));
        assert_eq!(Direction::Down.delta(), (0, 1));
    }

    #[test]
    fn test_index_mapping() {
        for (idx, dir) in Direction::ALL.iter().enumerate() {
            assert_eq!(dir.index(), idx);
            assert_eq!(Direction::from_index(idx).unwrap(), *dir);
        }
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        let err = Direction::try_from(4).unwrap_err();
        assert!(matches!(err, Error::InvalidAction { index: 4, count: 4 }));
    }
}
