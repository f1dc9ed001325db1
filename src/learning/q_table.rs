use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Dense action-value table: one row per flattened grid cell, one column per
/// action. Rows are stored contiguously.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QTable {
    n_states: usize,
    n_actions: usize,
    tab: Vec<f32>,
}

impl QTable {
    pub fn new(n_states: usize, n_actions: usize) -> Self {
        QTable {
            n_states,
            n_actions,
            tab: vec![0.0; n_states * n_actions],
        }
    }

    pub fn n_states(&self) -> usize {
        self.n_states
    }

    pub fn n_actions(&self) -> usize {
        self.n_actions
    }

    pub fn row(&self, state: usize) -> &[f32] {
        let start = state * self.n_actions;
        &self.tab[start..start + self.n_actions]
    }

    pub fn get(&self, state: usize, action: usize) -> f32 {
        self.tab[state * self.n_actions + action]
    }

    pub fn get_mut(&mut self, state: usize, action: usize) -> &mut f32 {
        &mut self.tab[state * self.n_actions + action]
    }

    /// Best value attainable from `state`.
    pub fn max_value(&self, state: usize) -> f32 {
        self.row(state)
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// Column indices of every action tied for the best value in `state`.
    pub fn best_actions(&self, state: usize) -> Vec<usize> {
        let best = self.max_value(state);
        self.row(state).iter().positions(|q| *q == best).collect()
    }
}
