//! Evaluation mode: play greedily with a trained Q-table
//!
//! Epsilon is forced to zero and the table is never updated or written back.
//! Runs until the step budget is used up or the run is cancelled, then prints
//! score and length statistics.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;

use super::train::{STATS_WINDOW, TrainConfig};
use crate::metrics::TrainingStats;
use crate::render::Renderer;
use crate::rl::{QAgent, SnakeEnvironment, run_episode};

pub struct EvaluateMode {
    agent: QAgent,
    env: SnakeEnvironment,
    stats: TrainingStats,
    config: TrainConfig,
    cancel: Arc<AtomicBool>,
}

impl EvaluateMode {
    pub fn new(config: TrainConfig, cancel: Arc<AtomicBool>) -> Result<Self> {
        let (env, mut agent) = config.build()?;
        agent.set_epsilon(0.0);

        if agent.q_table().is_empty() {
            tracing::warn!(
                path = %config.save_path.display(),
                "Evaluating with an empty Q-table"
            );
        }

        Ok(Self {
            agent,
            env,
            stats: TrainingStats::new(STATS_WINDOW),
            config,
            cancel,
        })
    }

    pub fn run(&mut self, renderer: &mut dyn Renderer) -> Result<&TrainingStats> {
        if !self.config.quiet {
            println!("Running evaluation mode (epsilon=0, no Q-table updates)...");
        }

        let mut episode = 0;
        loop {
            if self.cancel.load(Ordering::Relaxed) {
                tracing::info!("Evaluation interrupted");
                break;
            }

            let remaining = self
                .config
                .max_steps
                .map(|max| max.saturating_sub(self.stats.total_steps()));
            if remaining == Some(0) {
                break;
            }

            episode += 1;
            renderer.begin_episode(episode)?;
            let outcome = run_episode(&mut self.env, &mut self.agent, renderer, remaining, false)?;
            if outcome.aborted {
                tracing::info!(episode, "Evaluation interrupted");
                break;
            }

            self.stats
                .record_episode(0.0, outcome.steps, outcome.score, outcome.reason);
            tracing::debug!(
                episode,
                score = outcome.score,
                steps = outcome.steps,
                reason = outcome.reason.map(|r| r.as_str()),
                "Episode finished"
            );
        }

        self.print_summary();
        Ok(&self.stats)
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    pub fn agent(&self) -> &QAgent {
        &self.agent
    }

    fn print_summary(&self) {
        if !self.config.quiet && self.stats.total_episodes() > 0 {
            println!("{}", self.report());
        }
    }

    /// Multi-line summary of every evaluated episode
    pub fn report(&self) -> String {
        let stats = &self.stats;
        let reasons = stats.reasons();
        [
            format!("Episodes: {}", stats.total_episodes()),
            format!("Average Score: {:.2}", stats.lifetime_mean_score()),
            format!("Max Score: {}", stats.high_score()),
            format!("Min Score: {}", stats.low_score()),
            format!("Total Steps: {}", stats.total_steps()),
            format!(
                "Average Steps per Episode: {:.1}",
                stats.lifetime_mean_length()
            ),
            format!(
                "Endings: wall {} | tail {} | starved {} | out of budget {}",
                reasons.wall, reasons.tail, reasons.steps, reasons.unfinished
            ),
        ]
        .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameConfig;
    use crate::modes::TrainMode;
    use crate::render::HeadlessRenderer;
    use crate::rl::load_q_table;
    use tempfile::TempDir;

    fn config(dir: &TempDir, max_steps: usize) -> TrainConfig {
        let mut config = TrainConfig::new(dir.path().join("q_values.json"));
        config.max_steps = Some(max_steps);
        config.highscore_dir = dir.path().join("highscores");
        config.seed = Some(5);
        config.quiet = true;
        config.game_config = GameConfig::new(60, 60, 10);
        config.game_config.max_steps_since_food = 60;
        config
    }

    #[test]
    fn test_evaluation_leaves_table_untouched() {
        let dir = TempDir::new().unwrap();
        let cancel = Arc::new(AtomicBool::new(false));
        let mut renderer = HeadlessRenderer::new(cancel.clone());

        TrainMode::new(config(&dir, 400), cancel.clone())
            .unwrap()
            .run(&mut renderer)
            .unwrap();
        let trained = load_q_table(&dir.path().join("q_values.json")).unwrap();

        let mut eval = EvaluateMode::new(config(&dir, 300), cancel).unwrap();
        assert_eq!(eval.agent().epsilon(), 0.0);

        let stats = eval.run(&mut renderer).unwrap();
        assert_eq!(stats.total_steps(), 300);
        assert!(stats.total_episodes() > 0);
        assert!(stats.high_score() >= stats.low_score());
        assert!(eval.report().contains("Total Steps: 300"));

        // Visited rows may be added in memory, but no value changes
        for (key, row) in trained.iter() {
            assert_eq!(eval.agent().q_table().get(key), Some(row));
        }
        assert_eq!(load_q_table(&dir.path().join("q_values.json")).unwrap(), trained);
    }

    #[test]
    fn test_cancelled_evaluation_runs_nothing() {
        let dir = TempDir::new().unwrap();
        let cancel = Arc::new(AtomicBool::new(true));
        let mut renderer = HeadlessRenderer::new(cancel.clone());

        let mut eval = EvaluateMode::new(config(&dir, 100), cancel).unwrap();
        assert_eq!(eval.run(&mut renderer).unwrap().total_episodes(), 0);
    }
}
