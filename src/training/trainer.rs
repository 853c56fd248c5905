use std::path::PathBuf;
use std::time::Instant;

use crate::ai::TrainableAgent;
use crate::checkpoint::{CheckpointManager, CheckpointManagerConfig, CheckpointMetrics};
use crate::error::TrainingError;
use crate::game::{Connect4, Connect4State};
use crate::training::episode::{evaluate, play_episode};
use crate::training::metrics::{TimingMetrics, TrainingMetrics};

/// Trainer configuration. Interval values of 0 disable that step.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub num_episodes: usize,
    pub log_interval: usize,
    pub eval_interval: usize,
    pub eval_games: usize,
    pub checkpoint_interval: usize,
    pub checkpoint_dir: PathBuf,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            num_episodes: 10_000,
            log_interval: 100,
            eval_interval: 500,
            eval_games: 100,
            checkpoint_interval: 1000,
            checkpoint_dir: PathBuf::from("checkpoints"),
        }
    }
}

/// What a finished training run reports back.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    pub episodes: usize,
    pub final_episode: usize,
    pub final_win_rate: f32,
    pub table_size: usize,
}

fn due(episode: usize, interval: usize) -> bool {
    interval > 0 && episode % interval == 0
}

/// Self-play trainer for tabular agents.
pub struct Trainer {
    config: TrainerConfig,
    checkpoint_manager: CheckpointManager,
    eval_seed: Option<u64>,
}

impl Trainer {
    pub fn new(config: TrainerConfig, checkpoint: CheckpointManagerConfig) -> Self {
        let checkpoint_manager = CheckpointManager::new(CheckpointManagerConfig {
            checkpoint_dir: config.checkpoint_dir.clone(),
            ..checkpoint
        });
        Trainer {
            config,
            checkpoint_manager,
            eval_seed: None,
        }
    }

    /// Seed the evaluation opponent. Each evaluation derives its own seed from
    /// this and the episode number.
    pub fn with_eval_seed(mut self, seed: Option<u64>) -> Self {
        self.eval_seed = seed;
        self
    }

    fn opponent_seed(&self, episode: usize) -> Option<u64> {
        self.eval_seed.map(|seed| seed.wrapping_add(episode as u64))
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn checkpoint_manager(&self) -> &CheckpointManager {
        &self.checkpoint_manager
    }

    /// Run the full training loop, continuing from the agent's episode count.
    pub fn train<A>(&self, agent: &mut A) -> Result<TrainingSummary, TrainingError>
    where
        A: TrainableAgent<Connect4State> + ?Sized,
    {
        let mut env = Connect4::new();
        let mut metrics = TrainingMetrics::with_capacity(self.config.log_interval.max(100));
        let mut timing = TimingMetrics::new();

        let start_episode = agent.episode_count() + 1;
        let end_episode = agent.episode_count() + self.config.num_episodes;

        log::info!(
            "Starting {} training for {} episodes (episodes {}..{})",
            agent.name(),
            self.config.num_episodes,
            start_episode,
            end_episode
        );

        for episode in start_episode..=end_episode {
            let result = play_episode(&mut env, agent)?;
            metrics.record_episode(result);
            timing.record_episode();

            if due(episode, self.config.log_interval) {
                let window = self.config.log_interval;
                log::info!(
                    "Episode {}/{} | eps: {:.3} | p1_win({}): {:.1}% | draw: {:.1}% | invalid: {:.1}% | avg_len: {:.1} | states: {} | {:.0} ep/s",
                    episode,
                    end_episode,
                    agent.epsilon(),
                    window,
                    metrics.first_player_win_rate(window) * 100.0,
                    metrics.draw_rate(window) * 100.0,
                    metrics.invalid_move_rate(window) * 100.0,
                    metrics.average_game_length(window),
                    agent.table_size(),
                    timing.episodes_per_sec(),
                );
                timing.reset_window();
            }

            let eval_due = due(episode, self.config.eval_interval);
            let checkpoint_due = due(episode, self.config.checkpoint_interval);
            if !eval_due && !checkpoint_due {
                continue;
            }

            let started = Instant::now();
            let eval_wr = evaluate(agent, self.config.eval_games, self.opponent_seed(episode))?;
            if eval_due {
                log::info!(
                    "  >> Eval vs Random ({} games): {:.1}% win rate",
                    self.config.eval_games,
                    eval_wr * 100.0
                );
            }

            if checkpoint_due {
                let window = self.config.log_interval.max(1);
                let ckpt_metrics = CheckpointMetrics {
                    win_rate: eval_wr,
                    draw_rate: metrics.draw_rate(window),
                    average_game_length: metrics.average_game_length(window),
                    table_size: agent.table_size(),
                };
                match self
                    .checkpoint_manager
                    .save_checkpoint(agent, &ckpt_metrics, episode)
                {
                    Ok(path) => log::info!("  >> Checkpoint saved: {}", path.display()),
                    Err(e) => log::warn!("  >> Checkpoint failed: {}", e),
                }
            }
            timing.record_overhead(started.elapsed());
        }

        log::info!(
            "Training complete. Total episodes: {}",
            metrics.total_episodes()
        );

        let final_win_rate = evaluate(
            agent,
            self.config.eval_games,
            self.opponent_seed(end_episode.wrapping_add(1)),
        )?;
        log::info!(
            "Final eval vs Random: {:.1}% win rate",
            final_win_rate * 100.0
        );

        Ok(TrainingSummary {
            episodes: metrics.total_episodes(),
            final_episode: agent.episode_count(),
            final_win_rate,
            table_size: agent.table_size(),
        })
    }
}
