use std::time::{Duration, Instant};

/// Live counters shown next to the board while an agent plays
#[derive(Debug, Clone)]
pub struct GameMetrics {
    pub start_time: Instant,
    pub elapsed_time: Duration,
    /// 1-based number of the episode on screen
    pub episode: usize,
    pub high_score: u32,
    pub last_score: Option<u32>,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            elapsed_time: Duration::ZERO,
            episode: 0,
            high_score: 0,
            last_score: None,
        }
    }

    pub fn update(&mut self) {
        self.elapsed_time = self.start_time.elapsed();
    }

    pub fn on_episode_start(&mut self, episode: usize) {
        self.episode = episode;
        self.start_time = Instant::now();
        self.elapsed_time = Duration::ZERO;
    }

    /// Track the score of the running episode so the high score updates live
    pub fn observe_score(&mut self, score: u32) {
        self.high_score = self.high_score.max(score);
    }

    pub fn on_episode_end(&mut self, final_score: u32) {
        self.observe_score(final_score);
        self.last_score = Some(final_score);
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}
