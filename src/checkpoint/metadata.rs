use serde::{Deserialize, Serialize};

use crate::ai::BootstrapSign;

/// Metrics snapshot at checkpoint time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMetrics {
    /// Greedy win rate against the random agent.
    pub win_rate: f32,
    pub draw_rate: f32,
    pub average_game_length: f32,
    /// Number of states with a value row.
    pub table_size: usize,
}

/// Hyperparameters recorded in checkpoint metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointHyperparameters {
    pub learning_rate: f64,
    pub discount_factor: f64,
    pub epsilon: f64,
    pub epsilon_start: f64,
    pub epsilon_end: f64,
    pub epsilon_decay_episodes: usize,
    #[serde(default)]
    pub bootstrap_sign: BootstrapSign,
}

/// Top-level checkpoint metadata written to metadata.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    pub episode: usize,
    pub timestamp: u64,
    pub algorithm: String,
    pub metrics: CheckpointMetrics,
    pub hyperparameters: CheckpointHyperparameters,
}
