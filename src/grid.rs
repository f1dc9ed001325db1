use itertools::Itertools;
use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::actions::Action;
use crate::config::GridConfig;
use crate::error::GridError;
use crate::learning::reward::Reward;

/// A cell on the board. `x` is the column, `y` the row, with (0, 0) top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: usize,
    pub y: usize,
}

impl GridPosition {
    pub fn new(x: usize, y: usize) -> Self {
        GridPosition { x, y }
    }

    /// Row-major index of the cell in a board `columns` wide.
    pub fn index(&self, columns: usize) -> usize {
        self.y * columns + self.x
    }

    /// The neighbouring cell in the direction of `action`, or `None` if that
    /// would leave a `columns` x `rows` board.
    pub fn offset(&self, action: Action, columns: usize, rows: usize) -> Option<GridPosition> {
        let (dx, dy) = action.delta();
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        (x < columns && y < rows).then_some(GridPosition { x, y })
    }
}

/// What the learner observes: the cat's cell, or the end of the episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum State {
    Cell(GridPosition),
    Terminal,
}

impl State {
    pub fn is_terminal(&self) -> bool {
        matches!(self, State::Terminal)
    }

    pub fn position(&self) -> Option<GridPosition> {
        match self {
            State::Cell(pos) => Some(*pos),
            State::Terminal => None,
        }
    }
}

impl From<GridPosition> for State {
    fn from(pos: GridPosition) -> Self {
        State::Cell(pos)
    }
}

/// Result of one cat move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub state: State,
    pub reward: Reward,
    pub done: bool,
    pub won: bool,
}

/// The cat-and-mouse board.
///
/// Geometry is fixed at construction. Obstacles and both animals are placed
/// by [`GridWorld::reset`] at the start of every episode; before the first
/// reset the board has no obstacles.
#[derive(Debug, Clone)]
pub struct GridWorld {
    rows: usize,
    columns: usize,
    obstacle_num: usize,
    agent: GridPosition,
    target: GridPosition,
    obstacles: Vec<GridPosition>,
    rng: StdRng,
}

impl GridWorld {
    pub fn new(
        rows: usize,
        columns: usize,
        obstacle_num: usize,
        rng: StdRng,
    ) -> Result<Self, GridError> {
        let cells = rows * columns;
        if rows == 0 || columns == 0 || cells < 2 {
            return Err(GridError::GridTooSmall { rows, columns });
        }
        // Start and target cells are never obstacles.
        if obstacle_num > cells - 2 {
            return Err(GridError::TooManyObstacles {
                requested: obstacle_num,
                available: cells - 2,
            });
        }
        Ok(GridWorld {
            rows,
            columns,
            obstacle_num,
            agent: GridPosition::new(0, 0),
            target: GridPosition::new(columns - 1, rows - 1),
            obstacles: Vec::with_capacity(obstacle_num),
            rng,
        })
    }

    pub fn from_config(config: &GridConfig, rng: StdRng) -> Result<Self, GridError> {
        GridWorld::new(config.rows, config.columns, config.obstacle_num, rng)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn agent(&self) -> GridPosition {
        self.agent
    }

    pub fn target(&self) -> GridPosition {
        self.target
    }

    pub fn obstacles(&self) -> &[GridPosition] {
        &self.obstacles
    }

    pub fn is_obstacle(&self, pos: GridPosition) -> bool {
        self.obstacles.contains(&pos)
    }

    pub fn start_cell(&self) -> GridPosition {
        GridPosition::new(0, 0)
    }

    pub fn target_start_cell(&self) -> GridPosition {
        GridPosition::new(self.columns - 1, self.rows - 1)
    }

    /// Start a new episode: cat in the top-left corner, mouse in the
    /// bottom-right corner, and a fresh random obstacle layout.
    pub fn reset(&mut self) -> GridPosition {
        let start = self.start_cell();
        let goal = self.target_start_cell();
        self.agent = start;
        self.target = goal;

        let free = (0..self.rows)
            .cartesian_product(0..self.columns)
            .map(|(y, x)| GridPosition::new(x, y))
            .filter(|cell| *cell != start && *cell != goal)
            .collect_vec();
        // Uniform subset of the free cells, so placement always terminates.
        self.obstacles = free
            .choose_multiple(&mut self.rng, self.obstacle_num)
            .copied()
            .collect();

        debug!(
            "Reset | Cat: {:?} | Mouse: {:?} | Obstacles: {:?}",
            self.agent, self.target, self.obstacles
        );
        start
    }

    /// Move the mouse one cell in a uniformly random direction. The move is
    /// dropped if it would leave the board, hit an obstacle or land on the cat.
    pub fn wander(&mut self) {
        let direction = Action::random(&mut self.rng);
        match self.target.offset(direction, self.columns, self.rows) {
            Some(dest) if !self.is_obstacle(dest) && dest != self.agent => {
                trace!("Mouse {:?} -> {:?}", self.target, dest);
                self.target = dest;
            }
            _ => trace!("Mouse stays at {:?} ({:?} blocked)", self.target, direction),
        }
    }

    /// Per-turn hook for a presentation layer. Advances the mouse by one
    /// wander step; drawing and pacing are left to the caller.
    pub fn render(&mut self) {
        self.wander();
    }

    /// Move the cat by action index. Moves off the board leave the cat in
    /// place. Unknown indices are logged and treated as a no-op.
    pub fn step(&mut self, action: usize) -> StepOutcome {
        match Action::from_repr(action) {
            Some(action) => {
                if let Some(next) = self.agent.offset(action, self.columns, self.rows) {
                    self.agent = next;
                }
            }
            None => warn!(
                "Unexpected action index {}, cat stays at {:?}",
                action, self.agent
            ),
        }
        self.rewards(self.agent)
    }

    pub fn rewards(&self, position: GridPosition) -> StepOutcome {
        if position == self.target {
            StepOutcome {
                state: State::Terminal,
                reward: Reward::caught(),
                done: true,
                won: true,
            }
        } else if self.is_obstacle(position) {
            StepOutcome {
                state: State::Terminal,
                reward: Reward::collision(),
                done: true,
                won: false,
            }
        } else {
            StepOutcome {
                state: State::Cell(position),
                reward: Reward::step(),
                done: false,
                won: false,
            }
        }
    }
}
