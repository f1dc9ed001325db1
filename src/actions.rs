use rand::Rng;
use rand::distr::Distribution;
use rand::distr::StandardUniform as Standard;
use serde::{Deserialize, Serialize};
use strum::EnumCount;
use strum_macros::{EnumCount, EnumIter, FromRepr};

/// A single-cell move on the grid. The discriminant is the action index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumCount, FromRepr,
)]
#[repr(usize)]
pub enum Action {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Action {
    /// Displacement (dx, dy) of the move. Row 0 is the top of the grid.
    pub fn delta(&self) -> (isize, isize) {
        match self {
            Action::Up => (0, -1),
            Action::Down => (0, 1),
            Action::Left => (-1, 0),
            Action::Right => (1, 0),
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Standard.sample(rng)
    }
}

impl Distribution<Action> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Action {
        match Action::from_repr(rng.random_range(0..Action::COUNT)) {
            Some(action) => action,
            None => unreachable!(),
        }
    }
}
