use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::UInt;
use crate::actions::Action;
use crate::config::Config;
use crate::error::GridError;
use crate::grid::{GridWorld, State};
use crate::learning::learning_agent::{LearningParams, QLearningAgent};
use crate::learning::policy::Policy;
use crate::observer::{Observer, ObserverType, StepRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub episode: UInt,
    /// Turns taken, including the final one.
    pub steps: UInt,
    pub won: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub episodes: Vec<EpisodeSummary>,
}

impl TrainingReport {
    pub fn wins(&self) -> usize {
        self.episodes.iter().filter(|e| e.won).count()
    }

    pub fn win_rate(&self) -> f32 {
        if self.episodes.is_empty() {
            return 0.0;
        }
        self.wins() as f32 / self.episodes.len() as f32
    }

    pub fn mean_steps(&self) -> f32 {
        if self.episodes.is_empty() {
            return 0.0;
        }
        self.episodes.iter().map(|e| e.steps as f32).sum::<f32>() / self.episodes.len() as f32
    }
}

/// Drives episodes of cat-and-mouse. Only the policy's learned state and the
/// board geometry carry over from one episode to the next.
#[derive(Debug)]
pub struct TrainingLoop<P: Policy = QLearningAgent> {
    pub env: GridWorld,
    pub policy: P,
    observers: Vec<ObserverType>,
}

impl TrainingLoop<QLearningAgent> {
    /// Build a board and a Q-learning cat from config. A configured seed
    /// makes the whole run reproducible.
    pub fn from_config(config: &Config) -> Result<Self, GridError> {
        let (env_rng, agent_rng) = match config.training.seed {
            Some(seed) => (
                StdRng::seed_from_u64(seed),
                StdRng::seed_from_u64(seed.wrapping_add(1)),
            ),
            None => (StdRng::from_os_rng(), StdRng::from_os_rng()),
        };
        let env = GridWorld::from_config(&config.grid, env_rng)?;
        let agent = QLearningAgent::new(
            Action::iter().collect(),
            env.rows(),
            env.columns(),
            LearningParams::from(&config.rl),
            agent_rng,
        );
        Ok(TrainingLoop::new(env, agent))
    }
}

impl<P: Policy> TrainingLoop<P> {
    pub fn new(env: GridWorld, policy: P) -> Self {
        TrainingLoop {
            env,
            policy,
            observers: vec![],
        }
    }

    pub fn with_observer<O: Into<ObserverType>>(mut self, observer: O) -> Self {
        self.observers.push(observer.into());
        self
    }

    pub fn observers(&self) -> &[ObserverType] {
        &self.observers
    }

    /// Play one turn from `state`: the mouse wanders, then the cat picks a
    /// move and learns from it. The cat decides before seeing where the
    /// mouse went this turn.
    pub fn step_forward(&mut self, episode: UInt, step: UInt, state: &State) -> StepRecord {
        self.env.wander();
        let action = self.policy.choose_action(state);
        let outcome = self.env.step(action.index());
        self.policy
            .learn(state, action, outcome.reward, &outcome.state);

        let record = StepRecord {
            episode,
            step,
            state: *state,
            action,
            outcome,
            target: self.env.target(),
        };
        for observer in self.observers.iter_mut() {
            observer.on_step(&record, &self.env);
        }
        record
    }

    pub fn run_episode(&mut self, episode: UInt) -> EpisodeSummary {
        let mut state = State::from(self.env.reset());
        for observer in self.observers.iter_mut() {
            observer.on_reset(episode, &self.env);
        }

        let mut steps = 0;
        let won = loop {
            steps += 1;
            let record = self.step_forward(episode, steps, &state);
            state = record.outcome.state;
            if record.outcome.done {
                break record.outcome.won;
            }
        };

        let summary = EpisodeSummary {
            episode,
            steps,
            won,
        };
        for observer in self.observers.iter_mut() {
            observer.on_episode_end(&summary);
        }
        summary
    }

    pub fn run(&mut self, episodes: UInt) -> TrainingReport {
        let mut report = TrainingReport::default();
        for episode in 0..episodes {
            report.episodes.push(self.run_episode(episode));
            debug!("Finished episode {}/{}", episode + 1, episodes);
        }
        info!(
            "Training done | Episodes: {} | Wins: {} | Win rate: {:.2} | Mean steps: {:.1}",
            episodes,
            report.wins(),
            report.win_rate(),
            report.mean_steps()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CAUGHT_REWARD;
    use crate::config::{GridConfig, TrainingConfig};
    use crate::learning::policy::RandomPolicy;
    use crate::observer::{HistoryRecorder, LogObserver};

    fn seeded_config(rows: usize, columns: usize, obstacle_num: usize, seed: u64) -> Config {
        Config {
            grid: GridConfig {
                rows,
                columns,
                obstacle_num,
            },
            training: TrainingConfig {
                episodes: 20,
                seed: Some(seed),
                report_path: None,
            },
            ..Config::default()
        }
    }

    fn history(training: &TrainingLoop) -> &HistoryRecorder {
        match training.observers().last() {
            Some(ObserverType::History(h)) => h,
            _ => panic!("expected a history recorder"),
        }
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let config = seeded_config(4, 4, 2, 2024);
        let mut a = TrainingLoop::from_config(&config).unwrap();
        let mut b = TrainingLoop::from_config(&config).unwrap();
        assert_eq!(a.run(30), b.run(30));
        assert_eq!(a.policy.q_table(), b.policy.q_table());
    }

    #[test]
    fn test_episodes_end_exactly_once() {
        let config = seeded_config(4, 4, 2, 8);
        let mut training = TrainingLoop::from_config(&config)
            .unwrap()
            .with_observer(LogObserver)
            .with_observer(HistoryRecorder::new());
        let report = training.run(25);
        let recorder = history(&training);

        assert_eq!(report.episodes.len(), 25);
        assert_eq!(recorder.episodes, report.episodes);
        assert_eq!(recorder.layouts.len(), 25);
        let total: UInt = report.episodes.iter().map(|e| e.steps).sum();
        assert_eq!(recorder.steps.len(), total as usize);

        for summary in &report.episodes {
            let steps: Vec<_> = recorder
                .steps
                .iter()
                .filter(|r| r.episode == summary.episode)
                .collect();
            assert_eq!(steps.len(), summary.steps as usize);
            let (last, rest) = steps.split_last().unwrap();
            assert!(rest.iter().all(|r| !r.outcome.done));
            assert!(last.outcome.done);
            assert_eq!(last.outcome.state, State::Terminal);
            assert_eq!(last.outcome.won, summary.won);
            assert_eq!(summary.won, last.outcome.reward.val == CAUGHT_REWARD);
            // Each turn's state is the previous turn's outcome.
            for pair in steps.windows(2) {
                assert_eq!(pair[1].state, pair[0].outcome.state);
            }
            assert!(matches!(steps[0].state, State::Cell(pos) if pos.x == 0 && pos.y == 0));
        }
    }

    #[test]
    fn test_capture_resolves_against_moved_mouse() {
        let config = seeded_config(3, 3, 1, 99);
        let mut training = TrainingLoop::from_config(&config)
            .unwrap()
            .with_observer(HistoryRecorder::new());
        training.run(40);
        let recorder = history(&training);
        for record in recorder.steps.iter().filter(|r| r.outcome.won) {
            let from = record.state.position().unwrap();
            let dest = from
                .offset(record.action, 3, 3)
                .unwrap_or(from);
            assert_eq!(dest, record.target);
        }
    }

    #[test]
    fn test_layout_changes_between_episodes() {
        let config = seeded_config(6, 6, 4, 17);
        let mut training = TrainingLoop::from_config(&config)
            .unwrap()
            .with_observer(HistoryRecorder::new());
        training.run(10);
        let layouts = &history(&training).layouts;
        assert!(layouts.windows(2).any(|pair| pair[0] != pair[1]));
    }

    #[test]
    fn test_learns_to_catch_stuck_mouse() {
        // One row, two cells: the mouse can never move, moving right always wins.
        let config = seeded_config(1, 2, 0, 3);
        let mut training = TrainingLoop::from_config(&config).unwrap();
        let report = training.run(200);
        assert_eq!(report.win_rate(), 1.0);

        let q = training.policy.q_table();
        assert_eq!(q.best_actions(0), vec![Action::Right.index()]);
        assert!(q.get(0, Action::Right.index()) > 9.0);
    }

    #[test]
    fn test_random_policy_baseline() {
        let env = GridWorld::new(3, 3, 2, StdRng::seed_from_u64(1)).unwrap();
        let mut training = TrainingLoop::new(env, RandomPolicy::new(StdRng::seed_from_u64(2)));
        let report = training.run(50);
        assert_eq!(report.episodes.len(), 50);
        assert!(report.episodes.iter().all(|e| e.steps >= 1));
    }

    #[test]
    fn test_from_config_rejects_overfull_grid() {
        let config = seeded_config(2, 2, 3, 0);
        assert!(matches!(
            TrainingLoop::from_config(&config),
            Err(GridError::TooManyObstacles { .. })
        ));
    }

    #[test]
    fn test_report_statistics() {
        let report = TrainingReport {
            episodes: vec![
                EpisodeSummary {
                    episode: 0,
                    steps: 4,
                    won: true,
                },
                EpisodeSummary {
                    episode: 1,
                    steps: 2,
                    won: false,
                },
            ],
        };
        assert_eq!(report.wins(), 1);
        assert_eq!(report.win_rate(), 0.5);
        assert_eq!(report.mean_steps(), 3.0);
        assert_eq!(TrainingReport::default().win_rate(), 0.0);
    }
}
