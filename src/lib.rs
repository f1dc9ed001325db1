pub mod actions;
pub mod config;
pub mod error;
pub mod grid;
pub mod learning;
pub mod observer;
pub mod simulation;

pub type Int = i32;
pub type UInt = u32;

pub const CAUGHT_REWARD: Int = 10;
pub const COLLISION_REWARD: Int = -10;
pub const STEP_REWARD: Int = -1;
