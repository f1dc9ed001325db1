use log::trace;
use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::actions::Action;
use crate::config::RlConfig;
use crate::grid::State;
use crate::learning::policy::Policy;
use crate::learning::q_table::QTable;
use crate::learning::reward::Reward;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearningParams {
    /// Step size (alpha).
    pub learning_rate: f32,
    /// Reward decay (gamma).
    pub discount: f32,
    /// Probability of taking the greedy action rather than a random one.
    pub epsilon: f32,
}

impl Default for LearningParams {
    fn default() -> Self {
        LearningParams {
            learning_rate: 0.1,
            discount: 0.9,
            epsilon: 0.9,
        }
    }
}

impl From<&RlConfig> for LearningParams {
    fn from(config: &RlConfig) -> Self {
        LearningParams {
            learning_rate: config.learning_rate,
            discount: config.discount,
            epsilon: config.epsilon,
        }
    }
}

/// Tabular Q-learning cat. Column `i` of the table holds the value of
/// `actions[i]`.
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    actions: Vec<Action>,
    params: LearningParams,
    columns: usize,
    q_table: QTable,
    rng: StdRng,
}

impl QLearningAgent {
    pub fn new(
        actions: Vec<Action>,
        rows: usize,
        columns: usize,
        params: LearningParams,
        rng: StdRng,
    ) -> Self {
        assert!(!actions.is_empty(), "action set must not be empty");
        let q_table = QTable::new(rows * columns, actions.len());
        QLearningAgent {
            actions,
            params,
            columns,
            q_table,
            rng,
        }
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn params(&self) -> &LearningParams {
        &self.params
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    fn row_of(&self, state: &State) -> usize {
        match state {
            State::Cell(pos) => pos.index(self.columns),
            State::Terminal => panic!("terminal state has no row in the Q table"),
        }
    }

    fn column_of(&self, action: Action) -> usize {
        match self.actions.iter().position(|a| *a == action) {
            Some(col) => col,
            None => panic!("{action:?} is not in the agent's action set"),
        }
    }

    /// Epsilon-greedy choice. Ties for the best value are broken uniformly
    /// at random.
    pub fn choose_action(&mut self, state: &State) -> Action {
        let row = self.row_of(state);
        let col = if self.rng.random::<f32>() < self.params.epsilon {
            let best = self.q_table.best_actions(row);
            best[self.rng.random_range(0..best.len())]
        } else {
            self.rng.random_range(0..self.actions.len())
        };
        self.actions[col]
    }

    /// One-step Q-learning update towards `reward + gamma * max Q(next, .)`,
    /// or towards `reward` alone when `next_state` is terminal.
    pub fn learn(&mut self, state: &State, action: Action, reward: Reward, next_state: &State) {
        let row = self.row_of(state);
        let col = self.column_of(action);
        let q_predict = self.q_table.get(row, col);
        let q_target = match next_state {
            State::Terminal => reward.as_f32(),
            State::Cell(pos) => {
                reward.as_f32()
                    + self.params.discount * self.q_table.max_value(pos.index(self.columns))
            }
        };
        let q = self.q_table.get_mut(row, col);
        *q += self.params.learning_rate * (q_target - q_predict);
        trace!(
            "Q[{}, {:?}]: {:.3} -> {:.3} (target {:.3})",
            row, action, q_predict, *q, q_target
        );
    }
}

impl Policy for QLearningAgent {
    fn choose_action(&mut self, state: &State) -> Action {
        QLearningAgent::choose_action(self, state)
    }

    fn learn(&mut self, state: &State, action: Action, reward: Reward, next_state: &State) {
        QLearningAgent::learn(self, state, action, reward, next_state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridPosition;
    use rand::SeedableRng;
    use strum::IntoEnumIterator;

    fn agent(epsilon: f32, seed: u64) -> QLearningAgent {
        QLearningAgent::new(
            Action::iter().collect(),
            4,
            4,
            LearningParams {
                epsilon,
                ..LearningParams::default()
            },
            StdRng::seed_from_u64(seed),
        )
    }

    fn cell(x: usize, y: usize) -> State {
        State::Cell(GridPosition::new(x, y))
    }

    #[test]
    fn test_learn_non_terminal() {
        let mut rl = agent(0.9, 0);
        rl.learn(&cell(0, 0), Action::Down, Reward::new(-1), &cell(0, 1));
        assert!((rl.q_table().get(0, 1) - (-0.1)).abs() < 1e-6);
        // Every other entry is untouched.
        assert_eq!(rl.q_table().row(0)[0], 0.0);
        assert_eq!(rl.q_table().row(4), [0.0; 4]);
    }

    #[test]
    fn test_learn_uses_max_of_next_row() {
        let mut rl = agent(0.9, 0);
        // Drive Q[(1,0), Left] close to 10 with repeated terminal updates.
        for _ in 0..200 {
            rl.learn(&cell(1, 0), Action::Left, Reward::new(10), &State::Terminal);
        }
        let best_next = rl.q_table().max_value(1);
        assert!((best_next - 10.0).abs() < 1e-3);

        rl.learn(&cell(0, 0), Action::Right, Reward::new(-1), &cell(1, 0));
        let expected = 0.1 * (-1.0 + 0.9 * best_next);
        assert!((rl.q_table().get(0, 3) - expected).abs() < 1e-5);
    }

    #[test]
    fn test_learn_terminal_ignores_future() {
        let mut rl = agent(0.9, 0);
        rl.learn(&cell(2, 3), Action::Right, Reward::new(10), &State::Terminal);
        assert!((rl.q_table().get(14, 3) - 1.0).abs() < 1e-6);
        rl.learn(&cell(0, 0), Action::Down, Reward::new(-10), &State::Terminal);
        assert!((rl.q_table().get(0, 1) - (-1.0)).abs() < 1e-6);
    }

    #[test]
    fn test_greedy_picks_unique_best() {
        let mut rl = agent(1.0, 11);
        rl.learn(&cell(1, 1), Action::Left, Reward::new(10), &State::Terminal);
        for _ in 0..100 {
            assert_eq!(rl.choose_action(&cell(1, 1)), Action::Left);
        }
    }

    #[test]
    fn test_greedy_avoids_worse_actions() {
        let mut rl = agent(1.0, 12);
        rl.learn(&cell(0, 0), Action::Up, Reward::new(-1), &cell(0, 0));
        rl.learn(&cell(0, 0), Action::Left, Reward::new(-1), &cell(0, 0));
        for _ in 0..200 {
            let a = rl.choose_action(&cell(0, 0));
            assert!(a == Action::Down || a == Action::Right);
        }
    }

    #[test]
    fn test_greedy_tie_breaking_is_uniform() {
        let mut rl = agent(1.0, 42);
        let trials = 8000;
        let mut counts = [0usize; 4];
        for _ in 0..trials {
            counts[rl.choose_action(&cell(2, 2)).index()] += 1;
        }
        for count in counts {
            let share = count as f32 / trials as f32;
            assert!((share - 0.25).abs() < 0.03, "counts: {counts:?}");
        }
    }

    #[test]
    fn test_exploration_ignores_values() {
        let mut rl = agent(0.0, 5);
        rl.learn(&cell(1, 1), Action::Left, Reward::new(10), &State::Terminal);
        let trials = 8000;
        let mut counts = [0usize; 4];
        for _ in 0..trials {
            counts[rl.choose_action(&cell(1, 1)).index()] += 1;
        }
        for count in counts {
            let share = count as f32 / trials as f32;
            assert!((share - 0.25).abs() < 0.03, "counts: {counts:?}");
        }
    }

    #[test]
    fn test_choose_action_is_deterministic_under_seed() {
        let mut a = agent(0.5, 77);
        let mut b = agent(0.5, 77);
        for _ in 0..100 {
            assert_eq!(a.choose_action(&cell(3, 1)), b.choose_action(&cell(3, 1)));
        }
    }

    #[test]
    #[should_panic]
    fn test_choose_action_on_terminal_panics() {
        let mut rl = agent(0.9, 0);
        rl.choose_action(&State::Terminal);
    }
}
