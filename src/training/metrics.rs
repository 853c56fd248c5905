use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::game::{GameOutcome, Player};

/// Result of a single episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeResult {
    pub outcome: GameOutcome,
    pub game_length: usize,
}

/// Training metrics tracker with rolling window computations.
pub struct TrainingMetrics {
    episode_results: VecDeque<EpisodeResult>,
    capacity: usize,
    total_episodes: usize, // lifetime count, never capped
}

impl TrainingMetrics {
    pub fn with_capacity(capacity: usize) -> Self {
        TrainingMetrics {
            episode_results: VecDeque::with_capacity(capacity),
            capacity,
            total_episodes: 0,
        }
    }

    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    pub fn record_episode(&mut self, result: EpisodeResult) {
        self.total_episodes += 1;
        self.episode_results.push_back(result);
        if self.episode_results.len() > self.capacity {
            self.episode_results.pop_front();
        }
    }

    fn rate(&self, last_n: usize, pred: impl Fn(&EpisodeResult) -> bool) -> f32 {
        let n = self.episode_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let hits = self
            .episode_results
            .iter()
            .rev()
            .take(n)
            .filter(|r| pred(r))
            .count();
        hits as f32 / n as f32
    }

    /// Win rate for the first player in the last N episodes.
    pub fn first_player_win_rate(&self, last_n: usize) -> f32 {
        self.rate(last_n, |r| r.outcome == GameOutcome::Winner(Player::One))
    }

    /// Draw rate in the last N episodes.
    pub fn draw_rate(&self, last_n: usize) -> f32 {
        self.rate(last_n, |r| r.outcome == GameOutcome::Draw)
    }

    /// Fraction of the last N episodes that ended on an illegal move.
    pub fn invalid_move_rate(&self, last_n: usize) -> f32 {
        self.rate(last_n, |r| matches!(r.outcome, GameOutcome::InvalidMove(_)))
    }

    /// Average game length over the last N episodes.
    pub fn average_game_length(&self, last_n: usize) -> f32 {
        let n = self.episode_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let total: usize = self
            .episode_results
            .iter()
            .rev()
            .take(n)
            .map(|r| r.game_length)
            .sum();
        total as f32 / n as f32
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }
}

impl Default for TrainingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Throughput tracker for the training loop.
pub struct TimingMetrics {
    window_start: Instant,
    window_count: usize,
    window_overhead: Duration, // eval/checkpoint time excluded from throughput
}

impl TimingMetrics {
    pub fn new() -> Self {
        TimingMetrics {
            window_start: Instant::now(),
            window_count: 0,
            window_overhead: Duration::ZERO,
        }
    }

    pub fn record_episode(&mut self) {
        self.window_count += 1;
    }

    /// Record time spent in eval or checkpoint saving so it is excluded from
    /// the throughput window.
    pub fn record_overhead(&mut self, d: Duration) {
        self.window_overhead += d;
    }

    /// Episodes per second since the last `reset_window` call.
    pub fn episodes_per_sec(&self) -> f32 {
        let net = self.window_start.elapsed().saturating_sub(self.window_overhead);
        if net.is_zero() {
            return 0.0;
        }
        self.window_count as f32 / net.as_secs_f32()
    }

    /// Reset the throughput window (call after each log interval).
    pub fn reset_window(&mut self) {
        self.window_start = Instant::now();
        self.window_count = 0;
        self.window_overhead = Duration::ZERO;
    }
}

impl Default for TimingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(outcome: GameOutcome, game_length: usize) -> EpisodeResult {
        EpisodeResult {
            outcome,
            game_length,
        }
    }

    #[test]
    fn test_first_player_win_rate() {
        let mut m = TrainingMetrics::new();
        for _ in 0..7 {
            m.record_episode(result(GameOutcome::Winner(Player::One), 10));
        }
        for _ in 0..3 {
            m.record_episode(result(GameOutcome::Winner(Player::Two), 10));
        }
        assert!((m.first_player_win_rate(10) - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_draw_and_invalid_rates() {
        let mut m = TrainingMetrics::new();
        m.record_episode(result(GameOutcome::Draw, 42));
        m.record_episode(result(GameOutcome::InvalidMove(Player::Two), 7));
        m.record_episode(result(GameOutcome::Winner(Player::One), 9));
        m.record_episode(result(GameOutcome::Winner(Player::One), 9));
        assert!((m.draw_rate(10) - 0.25).abs() < 1e-6);
        assert!((m.invalid_move_rate(10) - 0.25).abs() < 1e-6);
        // window of the 2 most recent
        assert_eq!(m.draw_rate(2), 0.0);
    }

    #[test]
    fn test_average_game_length() {
        let mut m = TrainingMetrics::new();
        m.record_episode(result(GameOutcome::Draw, 20));
        m.record_episode(result(GameOutcome::Draw, 30));
        assert!((m.average_game_length(10) - 25.0).abs() < 1e-6);
    }

    #[test]
    fn test_capacity_caps_window_not_total() {
        let mut m = TrainingMetrics::with_capacity(3);
        for _ in 0..5 {
            m.record_episode(result(GameOutcome::Draw, 42));
        }
        m.record_episode(result(GameOutcome::Winner(Player::One), 7));
        assert_eq!(m.total_episodes(), 6);
        assert!((m.first_player_win_rate(100) - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_metrics_are_zero() {
        let m = TrainingMetrics::new();
        assert_eq!(m.draw_rate(10), 0.0);
        assert_eq!(m.average_game_length(10), 0.0);
    }

    #[test]
    fn test_overhead_excluded_from_eps_per_sec() {
        let mut t = TimingMetrics::new();
        for _ in 0..10 {
            t.record_episode();
        }
        t.record_overhead(Duration::from_secs(9999));
        assert_eq!(t.episodes_per_sec(), 0.0);

        t.reset_window();
        for _ in 0..5 {
            t.record_episode();
        }
        std::thread::sleep(Duration::from_millis(5));
        assert!(t.episodes_per_sec() > 0.0, "overhead should be cleared after reset");
    }
}
