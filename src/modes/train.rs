//! Training mode for the Q-learning agent
//!
//! Runs episodes until the total step budget is used up (or forever when there
//! is none), decays epsilon over the budget, periodically saves the Q-table,
//! snapshots it on every new high score and always flushes it on the way out,
//! including after a cancellation.
//!
//! # Example
//!
//! ```rust,no_run
//! use q_snake::modes::{TrainConfig, TrainMode};
//! use q_snake::render::HeadlessRenderer;
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use std::sync::atomic::AtomicBool;
//!
//! let mut config = TrainConfig::new(PathBuf::from("q_values.json"));
//! config.max_steps = Some(1_000_000);
//!
//! let cancel = Arc::new(AtomicBool::new(false));
//! let mut renderer = HeadlessRenderer::new(cancel.clone());
//! let mut train_mode = TrainMode::new(config, cancel)?;
//! train_mode.run(&mut renderer)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use rand::{SeedableRng, rngs::StdRng};

use crate::game::{GameConfig, GameEngine};
use crate::metrics::TrainingStats;
use crate::render::Renderer;
use crate::rl::{
    EpisodeOutcome, QAgent, QLearningConfig, SnakeEnvironment, StateEncoder, load_q_table,
    run_episode, save_q_table,
};

/// Episodes kept for rolling averages
pub(crate) const STATS_WINDOW: usize = 100;

/// Configuration shared by the training and evaluation drivers
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Total environment steps across all episodes (`None` = unlimited)
    pub max_steps: Option<usize>,

    /// Q-table file, loaded at start and written on save
    pub save_path: PathBuf,

    /// Save the Q-table every N episodes
    pub save_interval: usize,

    /// Directory receiving `highscore{N}.json` snapshots
    pub highscore_dir: PathBuf,

    /// Print a progress line every N episodes
    pub log_frequency: usize,

    /// Master seed; `None` seeds from the OS
    pub seed: Option<u64>,

    /// Suppress stdout progress lines (a full-screen renderer owns the terminal)
    pub quiet: bool,

    /// Board geometry and starvation limit
    pub game_config: GameConfig,

    /// Q-learning hyperparameters
    pub q_config: QLearningConfig,
}

impl TrainConfig {
    /// Create a configuration with defaults around a Q-table path
    ///
    /// # Example
    ///
    /// ```rust
    /// use q_snake::modes::TrainConfig;
    /// use std::path::PathBuf;
    ///
    /// let config = TrainConfig::new(PathBuf::from("q_values.json"));
    /// assert_eq!(config.save_interval, 1000);
    /// assert!(config.max_steps.is_none());
    /// ```
    pub fn new(save_path: PathBuf) -> Self {
        Self {
            max_steps: None,
            save_path,
            save_interval: 1000,
            highscore_dir: PathBuf::from("highscores"),
            log_frequency: 100,
            seed: None,
            quiet: false,
            game_config: GameConfig::default(),
            q_config: QLearningConfig::default(),
        }
    }

    /// Defaults with files laid out per state representation
    ///
    /// Tables for different encoders never share a file: `<encoder>/qvalues.json`
    /// and `<encoder>/highscores/`.
    pub fn for_encoder(encoder: StateEncoder) -> Self {
        let root = PathBuf::from(encoder.name());
        let mut config = Self::new(root.join("qvalues.json"));
        config.highscore_dir = root.join("highscores");
        config.q_config.encoder = encoder;
        config
    }

    /// Master RNG every other generator is forked from
    pub(crate) fn master_rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Build the environment and an agent around `save_path`'s table
    pub(crate) fn build(&self) -> Result<(SnakeEnvironment, QAgent)> {
        self.game_config
            .validate()
            .context("Invalid game configuration")?;

        let q_table = load_q_table(&self.save_path)
            .with_context(|| format!("Failed to load Q-table from {:?}", self.save_path))?;

        let mut master = self.master_rng();
        let env_rng = StdRng::from_rng(&mut master);
        let agent_rng = StdRng::from_rng(&mut master);

        let env = SnakeEnvironment::new(GameEngine::new(self.game_config.clone(), env_rng));
        let agent = QAgent::new(
            self.q_config.clone(),
            self.game_config.clone(),
            q_table,
            agent_rng,
        )
        .context("Invalid Q-learning configuration")?;

        Ok((env, agent))
    }
}

/// Exploration rate after `total_steps` of a `max_steps` budget
///
/// Follows `ε₀ · (0.8 − (t / T)⁴)`, clamped at zero.
pub fn scheduled_epsilon(initial: f64, total_steps: usize, max_steps: usize) -> f64 {
    let progress = total_steps as f64 / max_steps.max(1) as f64;
    (initial * (0.8 - progress.powi(4))).max(0.0)
}

/// Training mode for the Q-learning agent
pub struct TrainMode {
    agent: QAgent,
    env: SnakeEnvironment,
    stats: TrainingStats,
    config: TrainConfig,
    cancel: Arc<AtomicBool>,
    total_steps: usize,
    episode: usize,
}

impl TrainMode {
    /// Create a new training mode, loading any existing Q-table
    pub fn new(config: TrainConfig, cancel: Arc<AtomicBool>) -> Result<Self> {
        let (env, agent) = config.build()?;

        Ok(Self {
            agent,
            env,
            stats: TrainingStats::new(STATS_WINDOW),
            config,
            cancel,
            total_steps: 0,
            episode: 0,
        })
    }

    /// Run the training loop
    ///
    /// The Q-table is flushed to `save_path` before returning, whether the
    /// budget ran out or the run was cancelled.
    pub fn run(&mut self, renderer: &mut dyn Renderer) -> Result<&TrainingStats> {
        self.print_header();

        let result = self.train_loop(renderer);
        let flushed = self.save();

        result?;
        flushed?;

        if !self.config.quiet {
            println!("\nTraining complete!");
            println!("Q-table saved to: {:?}", self.config.save_path);
            println!("\nFinal Statistics:");
            println!("{}", self.stats.format_summary());
        }

        Ok(&self.stats)
    }

    fn train_loop(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        let initial_epsilon = self.config.q_config.epsilon;

        loop {
            if self.cancel.load(Ordering::Relaxed) {
                tracing::info!("Training interrupted, saving Q-table");
                return Ok(());
            }

            let remaining = self
                .config
                .max_steps
                .map(|max| max.saturating_sub(self.total_steps));
            if remaining == Some(0) {
                tracing::info!(
                    max_steps = self.config.max_steps,
                    "Reached maximum steps"
                );
                return Ok(());
            }

            if let Some(max) = self.config.max_steps {
                self.agent
                    .set_epsilon(scheduled_epsilon(initial_epsilon, self.total_steps, max));
            }

            self.episode += 1;
            renderer.begin_episode(self.episode)?;
            let outcome = run_episode(&mut self.env, &mut self.agent, renderer, remaining, true)?;
            if outcome.aborted {
                tracing::info!(episode = self.episode, "Episode aborted, saving Q-table");
                return Ok(());
            }

            self.record(&outcome)?;
        }
    }

    fn record(&mut self, outcome: &EpisodeOutcome) -> Result<()> {
        self.total_steps += outcome.steps;
        let is_high_score = self.stats.record_episode(
            outcome.total_reward,
            outcome.steps,
            outcome.score,
            outcome.reason,
        );

        tracing::debug!(
            episode = self.episode,
            score = outcome.score,
            steps = outcome.steps,
            reason = outcome.reason.map(|r| r.as_str()),
            epsilon = self.agent.epsilon(),
            "Episode finished"
        );

        if is_high_score {
            self.save_high_score(outcome.score)?;
        }

        if self.episode % self.config.log_frequency.max(1) == 0 {
            self.print_progress();
        }

        if self.episode % self.config.save_interval.max(1) == 0 {
            self.save()?;
        }

        Ok(())
    }

    /// Snapshot the table as `highscore{N}.json`
    fn save_high_score(&self, score: u32) -> Result<()> {
        let path = self
            .config
            .highscore_dir
            .join(format!("highscore{score}.json"));
        save_q_table(self.agent.q_table(), &path)
            .with_context(|| format!("Failed to save high score snapshot to {:?}", path))?;

        tracing::info!(score, episode = self.episode, path = %path.display(), "New high score");
        Ok(())
    }

    /// Write the Q-table to `save_path`
    fn save(&self) -> Result<()> {
        save_q_table(self.agent.q_table(), &self.config.save_path)
            .with_context(|| format!("Failed to save Q-table to {:?}", self.config.save_path))
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    pub fn agent(&self) -> &QAgent {
        &self.agent
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn save_path(&self) -> &Path {
        &self.config.save_path
    }

    fn print_header(&self) {
        if self.config.quiet {
            return;
        }

        let game = &self.config.game_config;
        let q = &self.config.q_config;

        println!("{}", "=".repeat(70));
        println!("Q-Learning Training - Snake");
        println!("{}", "=".repeat(70));
        match self.config.max_steps {
            Some(max) => println!("Max steps: {max}"),
            None => println!("Max steps: unlimited"),
        }
        println!(
            "Board: {}x{} px, block {} ({}x{} cells)",
            game.display_width,
            game.display_height,
            game.block_size,
            game.columns(),
            game.rows()
        );
        println!("Starvation limit: {} steps", game.max_steps_since_food);
        println!("Q-Learning Config:");
        println!("  State representation: {}", q.encoder);
        println!("  Epsilon: {}", q.epsilon);
        println!("  Learning rate: {}", q.learning_rate);
        println!("  Discount: {}", q.discount);
        println!("Known states: {}", self.agent.q_table().len());
        println!("Saves: Every {} episodes", self.config.save_interval);
        println!("Logging: Every {} episodes", self.config.log_frequency);
        println!("Save path: {:?}", self.config.save_path);
        println!("{}", "=".repeat(70));
        println!();
    }

    fn print_progress(&self) {
        if self.config.quiet {
            return;
        }

        let budget = match self.config.max_steps {
            Some(max) => format!("{}/{}", self.total_steps, max),
            None => self.total_steps.to_string(),
        };
        println!(
            "[Episode {} | Step {} | ε {:.4}] {}",
            self.episode,
            budget,
            self.agent.epsilon(),
            self.stats.format_summary()
        );
    }
}
