use crate::checkpoint::CheckpointHyperparameters;
use crate::error::AgentError;
use crate::game::GameState;

/// Universal interface for all agents.
pub trait Agent<S: GameState> {
    /// Select an action during training; the agent may explore.
    fn choose_train_action(&mut self, state: &S) -> Result<usize, AgentError>;

    /// Select an action for evaluation play; no exploration.
    fn choose_test_action(&mut self, state: &S) -> Result<usize, AgentError>;

    /// Return the agent's display name.
    fn name(&self) -> &str;
}

/// Agents that learn from a recorded episode.
pub trait LearningAgent<S: GameState>: Agent<S> {
    /// Learn from one episode. `states[i]` is the state in which `actions[i]`
    /// was taken and `rewards[i]` is what that move earned.
    fn update_table_with_game(
        &mut self,
        states: &[S],
        actions: &[usize],
        rewards: &[f64],
    ) -> Result<(), AgentError>;
}

/// Extension trait for agents that support the full training lifecycle.
pub trait TrainableAgent<S: GameState>: LearningAgent<S> {
    /// Algorithm name for logging and checkpoint metadata.
    fn algorithm_name(&self) -> &str;
    /// Episodes learned from so far (for resume offset).
    fn episode_count(&self) -> usize;
    fn epsilon(&self) -> f64;
    fn set_epsilon(&mut self, epsilon: f64);
    /// Number of states with a materialized value row.
    fn table_size(&self) -> usize;
    fn hyperparameters(&self) -> CheckpointHyperparameters;
    /// Serialize the learned tables and training counters to JSON.
    fn table_json(&self) -> Result<String, serde_json::Error>;
    /// Replace the learned tables and counters from `table_json` output.
    fn restore_table_json(&mut self, json: &str) -> Result<(), serde_json::Error>;
}
