use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use q_snake::game::GameConfig;
use q_snake::modes::{EvaluateMode, TrainConfig, TrainMode};
use q_snake::render::{HeadlessRenderer, Renderer, TerminalRenderer};
use q_snake::rl::StateEncoder;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "q_snake")]
#[command(version, about = "Snake learned with tabular Q-learning")]
struct Cli {
    /// Maximum number of total steps (unlimited if omitted, train and evaluate)
    #[arg(long, env = "SNAKE_MAX_STEPS")]
    steps: Option<usize>,

    /// Show the board in the terminal while playing
    #[arg(long, env = "SNAKE_ENABLE_VISUALIZATION")]
    visuals: bool,

    /// State representation (basic or naive)
    #[arg(long, default_value = "basic", env = "SNAKE_STATE_REPRESENTATION")]
    state: StateEncoder,

    /// Run evaluation mode (no training, epsilon=0, no Q-table updates)
    #[arg(long, env = "SNAKE_EVALS_MODE")]
    evals: bool,

    /// Q-table file [default: <state>/qvalues.json]
    #[arg(long, env = "SNAKE_QVALUES_PATH")]
    qvalues: Option<PathBuf>,

    /// High score snapshot directory [default: <state>/highscores]
    #[arg(long, env = "SNAKE_HIGHSCORES_DIR")]
    highscores: Option<PathBuf>,

    /// Save the Q-table every N episodes
    #[arg(long, default_value_t = 1000, env = "SNAKE_QVALUES_SAVE_INTERVAL")]
    save_interval: usize,

    /// Print progress every N episodes
    #[arg(long, default_value_t = 100, env = "SNAKE_LOG_FREQUENCY")]
    log_frequency: usize,

    /// Frames per second with --visuals
    #[arg(long, default_value_t = 30, env = "SNAKE_FRAME_SPEED")]
    fps: u32,

    /// Seed for a reproducible run
    #[arg(long, env = "SNAKE_SEED")]
    seed: Option<u64>,

    /// Board width in pixels
    #[arg(long, default_value_t = 1000, env = "SNAKE_DISPLAY_WIDTH")]
    width: i32,

    /// Board height in pixels
    #[arg(long, default_value_t = 1000, env = "SNAKE_DISPLAY_HEIGHT")]
    height: i32,

    /// Size of one cell in pixels
    #[arg(long, default_value_t = 100, env = "SNAKE_BLOCK_SIZE")]
    block_size: i32,

    /// Steps without food before the snake starves
    #[arg(long, default_value_t = 2000, env = "SNAKE_MAX_STEPS_SINCE_LAST_FRUIT")]
    max_steps_since_food: u32,

    /// Exploration rate
    #[arg(long, default_value_t = 0.02, env = "SNAKE_EPSILON")]
    epsilon: f64,

    /// Learning rate (alpha)
    #[arg(long, default_value_t = 0.03, env = "SNAKE_LEARNING_RATE")]
    learning_rate: f64,

    /// Discount factor (gamma)
    #[arg(long, default_value_t = 0.9, env = "SNAKE_DISCOUNT")]
    discount: f64,
}

impl Cli {
    fn train_config(&self) -> TrainConfig {
        let mut config = TrainConfig::for_encoder(self.state);
        if let Some(path) = &self.qvalues {
            config.save_path = path.clone();
        }
        if let Some(dir) = &self.highscores {
            config.highscore_dir = dir.clone();
        }

        config.max_steps = self.steps;
        config.save_interval = self.save_interval;
        config.log_frequency = self.log_frequency;
        config.seed = self.seed;
        config.quiet = self.visuals;

        config.game_config = GameConfig::new(self.width, self.height, self.block_size);
        config.game_config.max_steps_since_food = self.max_steps_since_food;

        config.q_config.epsilon = self.epsilon;
        config.q_config.learning_rate = self.learning_rate;
        config.q_config.discount = self.discount;

        config
    }
}

fn init_logging(visuals: bool) -> Result<()> {
    // The terminal view owns stderr, so only problems get through by default
    let default = if visuals { "q_snake=warn" } else { "q_snake=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
}

fn run(cli: Cli, cancel: Arc<AtomicBool>) -> Result<()> {
    let config = cli.train_config();

    let mut renderer: Box<dyn Renderer> = if cli.visuals {
        Box::new(
            TerminalRenderer::new(config.game_config.clone(), cli.fps, cancel.clone())
                .context("Failed to set up terminal")?,
        )
    } else {
        Box::new(HeadlessRenderer::new(cancel.clone()))
    };

    if cli.evals {
        let mut mode = EvaluateMode::new(config, cancel)?;
        mode.run(renderer.as_mut())?;

        // Restore the terminal before printing
        drop(renderer);
        if cli.visuals && mode.stats().total_episodes() > 0 {
            println!("{}", mode.report());
        }
    } else {
        let mut mode = TrainMode::new(config, cancel)?;
        mode.run(renderer.as_mut())?;

        drop(renderer);
        if cli.visuals {
            println!("Q-table saved to: {:?}", mode.save_path());
            println!("{}", mode.stats().format_summary());
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.visuals)?;

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, stopping after the current step");
                cancel.store(true, Ordering::Relaxed);
            }
        });
    }

    // The episode loop is synchronous; keep it off the async workers
    tokio::task::spawn_blocking(move || run(cli, cancel))
        .await
        .context("Training task panicked")?
}
