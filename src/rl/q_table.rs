//! Q-table mapping encoded states to per-action value estimates

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::encoder::StateKey;
use crate::game::ACTION_COUNT;

/// One row of action values, indexed by action
pub type ActionValues = [f64; ACTION_COUNT];

/// Q-table keyed by state
///
/// Rows are created lazily, all zero, the first time a state is touched.
/// Serializes as a flat JSON object of key to value array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QTable {
    values: HashMap<StateKey, ActionValues>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the row for a state, if it has been visited
    pub fn get(&self, state: &StateKey) -> Option<&ActionValues> {
        self.values.get(state)
    }

    /// Get the row for a state, creating it if missing
    pub fn row_mut(&mut self, state: &StateKey) -> &mut ActionValues {
        self.values
            .entry(state.clone())
            .or_insert([0.0; ACTION_COUNT])
    }

    /// Highest value in the state's row
    pub fn max_value(&mut self, state: &StateKey) -> f64 {
        self.row_mut(state)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Greedy action for the state; ties go to the lowest action index
    pub fn greedy_action(&mut self, state: &StateKey) -> usize {
        let row: &ActionValues = self.row_mut(state);
        let mut best = 0;
        for (action, &value) in row.iter().enumerate().skip(1) {
            if value > row[best] {
                best = action;
            }
        }
        best
    }

    /// Iterate over all visited states and their rows
    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &ActionValues)> {
        self.values.iter()
    }

    /// Number of visited states
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
