use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use cat_mouse::{
    config::{Config, DEFAULT_CONFIG_PATH},
    observer::LogObserver,
    simulation::TrainingLoop,
};
use log::{info, warn};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = if path.exists() {
        Config::from_file(&path)?
    } else {
        warn!("No config at {}, using defaults", path.display());
        let config = Config::default();
        config.validate()?;
        config
    };
    info!(
        "Cat and Mouse | Grid: {}x{} | Obstacles: {} | Episodes: {} | Seed: {:?}",
        config.grid.columns,
        config.grid.rows,
        config.grid.obstacle_num,
        config.training.episodes,
        config.training.seed
    );

    let mut training = TrainingLoop::from_config(&config)?.with_observer(LogObserver);
    let report = training.run(config.training.episodes);
    println!(
        "Game Over! Won {}/{} episodes ({:.0}%), mean steps {:.1}",
        report.wins(),
        report.episodes.len(),
        report.win_rate() * 100.0,
        report.mean_steps()
    );

    if let Some(report_path) = &config.training.report_path {
        let writer = BufWriter::new(File::create(report_path)?);
        serde_json::to_writer_pretty(writer, &report)?;
        info!("Report written to {}", report_path.display());
    }
    Ok(())
}
