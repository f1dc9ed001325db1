use enum_dispatch::enum_dispatch;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::UInt;
use crate::actions::Action;
use crate::grid::{GridPosition, GridWorld, State, StepOutcome};
use crate::simulation::EpisodeSummary;

/// One turn of an episode as seen by a presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub episode: UInt,
    pub step: UInt,
    pub state: State,
    pub action: Action,
    pub outcome: StepOutcome,
    /// Mouse position the cat's move resolved against.
    pub target: GridPosition,
}

/// Consumer of simulation events. The board is handed out by shared
/// reference only, so observers can draw it but never change it.
#[enum_dispatch]
pub trait Observer {
    fn on_reset(&mut self, episode: UInt, world: &GridWorld);
    fn on_step(&mut self, record: &StepRecord, world: &GridWorld);
    fn on_episode_end(&mut self, summary: &EpisodeSummary);
}

#[derive(Debug)]
#[enum_dispatch(Observer)]
pub enum ObserverType {
    Log(LogObserver),
    History(HistoryRecorder),
}

/// Writes progress through the `log` facade.
#[derive(Debug, Clone, Default)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn on_reset(&mut self, episode: UInt, world: &GridWorld) {
        debug!(
            "Episode {} | Obstacles: {:?}",
            episode,
            world.obstacles()
        );
    }

    fn on_step(&mut self, record: &StepRecord, world: &GridWorld) {
        debug!(
            "Episode: {:4} | Step: {:4} | State: {:?} | Action: {:?} | Cat: {:?} | Mouse: {:?} | Reward: {}",
            record.episode,
            record.step,
            record.state,
            record.action,
            world.agent(),
            record.target,
            record.outcome.reward.val
        );
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) {
        info!(
            "Episode = {}, {}: {}",
            summary.episode,
            if summary.won { "Won" } else { "Dead" },
            summary.steps
        );
    }
}

/// Keeps every transition and episode summary in memory.
#[derive(Debug, Clone, Default)]
pub struct HistoryRecorder {
    pub steps: Vec<StepRecord>,
    pub episodes: Vec<EpisodeSummary>,
    pub layouts: Vec<Vec<GridPosition>>,
}

impl HistoryRecorder {
    pub fn new() -> Self {
        HistoryRecorder::default()
    }
}

impl Observer for HistoryRecorder {
    fn on_reset(&mut self, _episode: UInt, world: &GridWorld) {
        self.layouts.push(world.obstacles().to_vec());
    }

    fn on_step(&mut self, record: &StepRecord, _world: &GridWorld) {
        self.steps.push(record.clone());
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) {
        self.episodes.push(summary.clone());
    }
}
