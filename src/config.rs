use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::UInt;
use crate::error::{ConfigError, GridError};

pub const DEFAULT_CONFIG_PATH: &str = "./cat_mouse.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub grid: GridConfig,
    pub rl: RlConfig,
    pub training: TrainingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub rows: usize,
    pub columns: usize,
    pub obstacle_num: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            rows: 4,
            columns: 4,
            obstacle_num: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RlConfig {
    pub learning_rate: f32,
    pub discount: f32,
    /// Probability of acting greedily.
    pub epsilon: f32,
}

impl Default for RlConfig {
    fn default() -> Self {
        RlConfig {
            learning_rate: 0.1,
            discount: 0.9,
            epsilon: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub episodes: UInt,
    pub seed: Option<u64>,
    pub report_path: Option<PathBuf>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            episodes: 100,
            seed: None,
            report_path: None,
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let GridConfig {
            rows,
            columns,
            obstacle_num,
        } = self.grid;
        if rows == 0 || columns == 0 {
            return Err(ConfigError::Invalid(format!(
                "grid dimensions must be positive, got {rows}x{columns}"
            )));
        }
        if rows * columns < 2 {
            return Err(GridError::GridTooSmall { rows, columns }.into());
        }
        if obstacle_num > rows * columns - 2 {
            return Err(GridError::TooManyObstacles {
                requested: obstacle_num,
                available: rows * columns - 2,
            }
            .into());
        }
        let rl = &self.rl;
        if !(rl.learning_rate > 0.0 && rl.learning_rate <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "learning_rate must be in (0, 1], got {}",
                rl.learning_rate
            )));
        }
        if !(0.0..=1.0).contains(&rl.discount) {
            return Err(ConfigError::Invalid(format!(
                "discount must be in [0, 1], got {}",
                rl.discount
            )));
        }
        if !(0.0..=1.0).contains(&rl.epsilon) {
            return Err(ConfigError::Invalid(format!(
                "epsilon must be in [0, 1], got {}",
                rl.epsilon
            )));
        }
        if self.training.episodes == 0 {
            return Err(ConfigError::Invalid("episodes must be at least 1".into()));
        }
        Ok(())
    }
}
