use anyhow::{Context, Result};
use clap::Parser;
use lives_snake::game::GameConfig;
use lives_snake::modes::HumanMode;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lives_snake")]
#[command(version, about = "Snake with lives, immunity and a round clock")]
struct Cli {
    /// Grid rows
    #[arg(long, default_value = "15")]
    rows: usize,

    /// Grid columns
    #[arg(long, default_value = "15")]
    cols: usize,

    /// Lives per round
    #[arg(long, default_value = "3")]
    lives: u32,

    /// Round length in seconds
    #[arg(long, default_value = "63", conflicts_with = "no_time_limit")]
    time_limit: u32,

    /// Play without a round clock
    #[arg(long)]
    no_time_limit: bool,

    /// Load the game configuration from a JSON file instead of the flags above
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs to this file (filtered by RUST_LOG, default "info")
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn game_config(&self) -> Result<GameConfig> {
        if let Some(path) = &self.config {
            return load_config(path);
        }

        let time_limit = (!self.no_time_limit).then_some(self.time_limit);
        Ok(GameConfig::new(self.rows, self.cols)
            .with_lives(self.lives)
            .with_time_limit(time_limit))
    }
}

fn load_config(path: &Path) -> Result<GameConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// The terminal belongs to the UI, so logs only go to a file
fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!("Failed to install log subscriber: {err}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let config = cli.game_config()?;
    tracing::info!(?config, "starting");

    let mut human_mode = HumanMode::new(config).context("Invalid game configuration")?;
    human_mode.run().await?;

    Ok(())
}
