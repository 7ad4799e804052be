//! Per-episode record of visited states and chosen actions
//!
//! The agent appends one transition per environment step and replays the
//! whole trajectory once the episode is over.

use super::encoder::EncodedState;

/// A state the agent was in and the action it took there
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: EncodedState,
    pub action: usize,
}

/// Ordered transitions collected during one episode
///
/// # Example
///
/// ```rust
/// use q_snake::game::{Direction, Position};
/// use q_snake::rl::{StateEncoder, Trajectory};
///
/// let state = StateEncoder::Basic.encode(
///     Direction::Right,
///     &[Position::new(50, 50)],
///     Position::new(0, 0),
///     100,
///     100,
///     10,
/// );
///
/// let mut trajectory = Trajectory::new();
/// trajectory.push(state, 2);
/// assert_eq!(trajectory.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Trajectory {
    transitions: Vec<Transition>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transition
    pub fn push(&mut self, state: EncodedState, action: usize) {
        self.transitions.push(Transition { state, action });
    }

    /// The final transition, if any
    pub fn last(&self) -> Option<&Transition> {
        self.transitions.last()
    }

    /// Consecutive (current, next) pairs in recording order
    pub fn pairs(&self) -> impl Iterator<Item = (&Transition, &Transition)> {
        self.transitions.windows(2).map(|w| (&w[0], &w[1]))
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Drop all transitions
    pub fn clear(&mut self) {
        self.transitions.clear();
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, Position};
    use crate::rl::encoder::StateEncoder;

    fn state(x: i32) -> EncodedState {
        StateEncoder::Basic.encode(
            Direction::Right,
            &[Position::new(x, 50)],
            Position::new(0, 0),
            100,
            100,
            10,
        )
    }

    #[test]
    fn test_pairs_follow_recording_order() {
        let mut trajectory = Trajectory::new();
        trajectory.push(state(10), 0);
        trajectory.push(state(20), 1);
        trajectory.push(state(30), 2);

        let actions: Vec<(usize, usize)> = trajectory
            .pairs()
            .map(|(a, b)| (a.action, b.action))
            .collect();
        assert_eq!(actions, vec![(0, 1), (1, 2)]);
        assert_eq!(trajectory.last().map(|t| t.action), Some(2));
    }

    #[test]
    fn test_single_transition_has_no_pairs() {
        let mut trajectory = Trajectory::new();
        trajectory.push(state(10), 3);
        assert_eq!(trajectory.pairs().count(), 0);
    }

    #[test]
    fn test_clear() {
        let mut trajectory = Trajectory::new();
        trajectory.push(state(10), 0);
        trajectory.clear();
        assert!(trajectory.is_empty());
        assert!(trajectory.last().is_none());
    }
}
