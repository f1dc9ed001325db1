use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("Grid of {rows}x{columns} has no room for distinct start and target cells")]
    GridTooSmall { rows: usize, columns: usize },

    #[error("Cannot place {requested} obstacles: only {available} free cells")]
    TooManyObstacles { requested: usize, available: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error(transparent)]
    Grid(#[from] GridError),
}
