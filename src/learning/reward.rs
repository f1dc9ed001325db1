use serde::{Deserialize, Serialize};

use crate::{CAUGHT_REWARD, COLLISION_REWARD, Int, STEP_REWARD};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub val: Int,
}

impl Reward {
    pub fn new(val: Int) -> Self {
        Reward { val }
    }

    /// Cat landed on the mouse.
    pub fn caught() -> Self {
        Reward::new(CAUGHT_REWARD)
    }

    /// Cat ran into an obstacle.
    pub fn collision() -> Self {
        Reward::new(COLLISION_REWARD)
    }

    pub fn step() -> Self {
        Reward::new(STEP_REWARD)
    }

    pub fn as_f32(&self) -> f32 {
        self.val as f32
    }
}
