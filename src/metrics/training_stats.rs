//! Training statistics tracking for Q-learning runs
//!
//! Keeps rolling windows of recent episodes for smoothed progress lines, plus
//! lifetime aggregates (high/low score, termination reason counts) for the
//! final summary.

use std::collections::VecDeque;

use crate::game::TerminationReason;

/// How many episodes ended for each reason
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReasonCounts {
    pub wall: usize,
    pub tail: usize,
    pub steps: usize,
    /// Episodes cut short by the step budget
    pub unfinished: usize,
}

impl ReasonCounts {
    fn record(&mut self, reason: Option<TerminationReason>) {
        match reason {
            Some(TerminationReason::Wall) => self.wall += 1,
            Some(TerminationReason::Tail) => self.tail += 1,
            Some(TerminationReason::Steps) => self.steps += 1,
            None => self.unfinished += 1,
        }
    }
}

/// Training statistics tracker with rolling averages
///
/// # Example
///
/// ```rust
/// use q_snake::game::TerminationReason;
/// use q_snake::metrics::TrainingStats;
///
/// let mut stats = TrainingStats::new(100);
/// stats.record_episode(9.5, 150, 3, Some(TerminationReason::Wall));
///
/// assert_eq!(stats.high_score(), 3);
/// println!("{}", stats.format_summary());
/// ```
#[derive(Debug, Clone)]
pub struct TrainingStats {
    /// Total shaped reward per episode (rolling window)
    episode_rewards: VecDeque<f64>,

    /// Episode lengths in steps (rolling window)
    episode_lengths: VecDeque<usize>,

    /// Food eaten per episode (rolling window)
    episode_scores: VecDeque<u32>,

    reasons: ReasonCounts,
    high_score: u32,
    low_score: Option<u32>,
    score_sum: u64,
    total_episodes: usize,
    total_steps: usize,
    window_size: usize,
}

impl TrainingStats {
    /// Create a new tracker keeping the last `window_size` episodes
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            episode_rewards: VecDeque::with_capacity(window_size),
            episode_lengths: VecDeque::with_capacity(window_size),
            episode_scores: VecDeque::with_capacity(window_size),
            reasons: ReasonCounts::default(),
            high_score: 0,
            low_score: None,
            score_sum: 0,
            total_episodes: 0,
            total_steps: 0,
            window_size,
        }
    }

    /// Record the completion of an episode
    ///
    /// # Arguments
    ///
    /// * `reward` - Total shaped reward of the episode
    /// * `length` - Number of steps taken in the episode
    /// * `score` - Food eaten
    /// * `reason` - Why the episode ended (`None` if the step budget ran out)
    ///
    /// # Returns
    ///
    /// `true` when the score beats every previous episode
    pub fn record_episode(
        &mut self,
        reward: f64,
        length: usize,
        score: u32,
        reason: Option<TerminationReason>,
    ) -> bool {
        Self::push_deque(&mut self.episode_rewards, reward, self.window_size);
        Self::push_deque(&mut self.episode_lengths, length, self.window_size);
        Self::push_deque(&mut self.episode_scores, score, self.window_size);

        self.reasons.record(reason);
        self.total_episodes += 1;
        self.total_steps += length;
        self.score_sum += u64::from(score);
        self.low_score = Some(self.low_score.map_or(score, |low| low.min(score)));

        let is_high_score = score > self.high_score;
        if is_high_score {
            self.high_score = score;
        }
        is_high_score
    }

    /// Mean episode reward over the rolling window
    pub fn mean_episode_reward(&self) -> f64 {
        if self.episode_rewards.is_empty() {
            0.0
        } else {
            self.episode_rewards.iter().sum::<f64>() / self.episode_rewards.len() as f64
        }
    }

    /// Mean episode length over the rolling window
    pub fn mean_episode_length(&self) -> f64 {
        Self::mean_of(self.episode_lengths.iter().map(|&l| l as f64))
    }

    /// Mean score over the rolling window
    pub fn mean_episode_score(&self) -> f64 {
        Self::mean_of(self.episode_scores.iter().map(|&s| f64::from(s)))
    }

    /// Mean score over every recorded episode
    pub fn lifetime_mean_score(&self) -> f64 {
        if self.total_episodes == 0 {
            0.0
        } else {
            self.score_sum as f64 / self.total_episodes as f64
        }
    }

    /// Mean episode length over every recorded episode
    pub fn lifetime_mean_length(&self) -> f64 {
        if self.total_episodes == 0 {
            0.0
        } else {
            self.total_steps as f64 / self.total_episodes as f64
        }
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    /// Lowest score seen, or 0 before the first episode
    pub fn low_score(&self) -> u32 {
        self.low_score.unwrap_or(0)
    }

    pub fn reasons(&self) -> ReasonCounts {
        self.reasons
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// One-line progress summary
    ///
    /// Episodes: 1 | Steps: 150 | Reward: 9.50 | Score: 3.00 | Len: 150.0 | High: 3 | Wall/Tail/Steps: 1/0/0
    pub fn format_summary(&self) -> String {
        format!(
            "Episodes: {} | Steps: {} | Reward: {:.2} | Score: {:.2} | Len: {:.1} | High: {} | Wall/Tail/Steps: {}/{}/{}",
            self.total_episodes,
            self.total_steps,
            self.mean_episode_reward(),
            self.mean_episode_score(),
            self.mean_episode_length(),
            self.high_score,
            self.reasons.wall,
            self.reasons.tail,
            self.reasons.steps,
        )
    }

    fn mean_of(values: impl ExactSizeIterator<Item = f64>) -> f64 {
        let len = values.len();
        if len == 0 {
            0.0
        } else {
            values.sum::<f64>() / len as f64
        }
    }

    fn push_deque<T>(deque: &mut VecDeque<T>, value: T, window_size: usize) {
        if deque.len() >= window_size {
            deque.pop_front();
        }
        deque.push_back(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let stats = TrainingStats::new(100);
        assert_eq!(stats.window_size(), 100);
        assert_eq!(stats.total_episodes(), 0);
        assert_eq!(stats.total_steps(), 0);
        assert_eq!(stats.low_score(), 0);
    }

    #[test]
    fn test_record_episode() {
        let mut stats = TrainingStats::new(100);
        assert!(stats.record_episode(10.0, 50, 3, Some(TerminationReason::Tail)));

        assert_eq!(stats.total_episodes(), 1);
        assert_eq!(stats.total_steps(), 50);
        assert!((stats.mean_episode_reward() - 10.0).abs() < 1e-9);
        assert!((stats.mean_episode_length() - 50.0).abs() < 1e-9);
        assert!((stats.mean_episode_score() - 3.0).abs() < 1e-9);
        assert_eq!(stats.reasons().tail, 1);
    }

    #[test]
    fn test_rolling_average() {
        let mut stats = TrainingStats::new(3);
        stats.record_episode(1.0, 10, 1, None);
        stats.record_episode(2.0, 20, 2, None);
        stats.record_episode(3.0, 30, 3, None);
        assert!((stats.mean_episode_reward() - 2.0).abs() < 1e-9);

        // Fourth episode evicts the first
        stats.record_episode(4.0, 40, 4, None);
        assert_eq!(stats.total_episodes(), 4);
        assert!((stats.mean_episode_reward() - 3.0).abs() < 1e-9);
        assert_eq!(stats.total_steps(), 100);
    }

    #[test]
    fn test_lifetime_aggregates_outlive_window() {
        let mut stats = TrainingStats::new(2);
        stats.record_episode(0.0, 10, 7, Some(TerminationReason::Wall));
        stats.record_episode(0.0, 10, 1, Some(TerminationReason::Steps));
        stats.record_episode(0.0, 10, 4, Some(TerminationReason::Wall));

        assert_eq!(stats.high_score(), 7);
        assert_eq!(stats.low_score(), 1);
        assert!((stats.lifetime_mean_score() - 4.0).abs() < 1e-9);
        assert!((stats.mean_episode_score() - 2.5).abs() < 1e-9);
        assert!((stats.lifetime_mean_length() - 10.0).abs() < 1e-9);
        assert_eq!(
            stats.reasons(),
            ReasonCounts {
                wall: 2,
                tail: 0,
                steps: 1,
                unfinished: 0
            }
        );
    }

    #[test]
    fn test_high_score_flag() {
        let mut stats = TrainingStats::new(10);
        // A zero score never counts as a new high score
        assert!(!stats.record_episode(0.0, 5, 0, None));
        assert!(stats.record_episode(0.0, 5, 2, None));
        assert!(!stats.record_episode(0.0, 5, 2, None));
        assert!(stats.record_episode(0.0, 5, 3, None));
    }

    #[test]
    fn test_format_summary() {
        let mut stats = TrainingStats::new(100);
        stats.record_episode(15.5, 150, 5, Some(TerminationReason::Wall));

        let summary = stats.format_summary();
        assert!(summary.contains("Episodes: 1"));
        assert!(summary.contains("Steps: 150"));
        assert!(summary.contains("Reward: 15.50"));
        assert!(summary.contains("Score: 5.00"));
        assert!(summary.contains("Len: 150.0"));
        assert!(summary.contains("High: 5"));
        assert!(summary.contains("Wall/Tail/Steps: 1/0/0"));
    }

    #[test]
    fn test_empty_stats() {
        let stats = TrainingStats::new(100);
        assert_eq!(stats.mean_episode_reward(), 0.0);
        assert_eq!(stats.mean_episode_length(), 0.0);
        assert_eq!(stats.mean_episode_score(), 0.0);
        assert_eq!(stats.lifetime_mean_score(), 0.0);
    }
}
