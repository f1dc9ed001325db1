use rand::rngs::StdRng;

use crate::actions::Action;
use crate::grid::State;
use crate::learning::reward::Reward;

/// Decides the cat's moves and, optionally, learns from the outcome.
pub trait Policy {
    /// Pick the next action. Never called with [`State::Terminal`].
    fn choose_action(&mut self, state: &State) -> Action;
    /// Observe one transition.
    fn learn(&mut self, state: &State, action: Action, reward: Reward, next_state: &State);
}

/// Uniformly random cat that never learns. Useful as a baseline.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(rng: StdRng) -> Self {
        RandomPolicy { rng }
    }
}

impl Policy for RandomPolicy {
    fn choose_action(&mut self, _state: &State) -> Action {
        Action::random(&mut self.rng)
    }

    fn learn(&mut self, _state: &State, _action: Action, _reward: Reward, _next_state: &State) {}
}
