use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use snake_rush::{Game, GameConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "snake_rush")]
#[command(version, about = "Terminal snake that speeds up as it grows")]
struct Cli {
    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Canvas side in render units
    #[arg(long)]
    canvas_size: Option<f64>,

    /// Grid cell size in render units
    #[arg(long)]
    cell_size: Option<f64>,

    /// Tick interval of a fresh snake, in milliseconds
    #[arg(long)]
    base_interval: Option<f64>,

    /// Alpha lost by burst particles per frame
    #[arg(long)]
    particle_decay: Option<f64>,

    /// Seed for food placement and particle bursts
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs to this file (the terminal is busy drawing the game)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the effective config as JSON and exit
    #[arg(long)]
    dump_config: bool,
}

impl Cli {
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)?,
            None => GameConfig::default(),
        };

        if let Some(size) = self.canvas_size {
            config.canvas_size = size;
        }
        if let Some(size) = self.cell_size {
            config.cell_size = size;
        }
        if let Some(interval) = self.base_interval {
            config.base_interval = interval;
        }
        if let Some(decay) = self.particle_decay {
            config.particles.decay = decay;
        }

        config.validate().context("Invalid game configuration")?;
        Ok(config)
    }
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let config = cli.game_config()?;
    if cli.dump_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }
    info!(tiles = config.tile_count(), base_interval = config.base_interval, "config loaded");

    let mut game = match cli.seed {
        Some(seed) => Game::with_seed(config, seed),
        None => Game::new(config),
    };
    game.run()
}
