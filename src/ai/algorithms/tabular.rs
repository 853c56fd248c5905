use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::ai::agent::{Agent, LearningAgent, TrainableAgent};
use crate::ai::table::{TableEntry, ValueTable};
use crate::checkpoint::CheckpointHyperparameters;
use crate::error::AgentError;
use crate::game::GameState;

/// How the discounted successor value enters the update target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapSign {
    /// `reward - discount * V(next)`: the successor is scored from the
    /// opponent's side of the board.
    #[default]
    Subtract,
    /// `reward + discount * V(next)`.
    Add,
}

/// Tabular agent hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabularConfig {
    /// Exploration rate at episode 0.
    pub epsilon: f64,
    pub epsilon_end: f64,
    /// Episodes over which epsilon decays linearly; 0 keeps it constant.
    pub epsilon_decay_episodes: usize,
    pub discount_factor: f64,
    pub learning_rate: f64,
    pub bootstrap_sign: BootstrapSign,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for TabularConfig {
    fn default() -> Self {
        TabularConfig {
            epsilon: 0.1,
            epsilon_end: 0.1,
            epsilon_decay_episodes: 0,
            discount_factor: 0.99,
            learning_rate: 0.1,
            bootstrap_sign: BootstrapSign::Subtract,
            seed: None,
        }
    }
}

impl TabularConfig {
    /// Linear schedule from `epsilon` to `epsilon_end`.
    pub fn epsilon_at(&self, episode: usize) -> f64 {
        if self.epsilon_decay_episodes == 0 {
            return self.epsilon;
        }
        let progress = (episode as f64 / self.epsilon_decay_episodes as f64).min(1.0);
        self.epsilon + (self.epsilon_end - self.epsilon) * progress
    }
}

/// The bootstrap strategy of a tabular agent.
pub trait UpdateRule<S: GameState> {
    /// Algorithm identifier written to checkpoints.
    const ALGORITHM: &'static str;
    /// Display name of agents using this rule.
    const AGENT_NAME: &'static str;

    fn new(width: usize) -> Self;

    /// Estimated value of `next_state` to bootstrap from.
    fn bootstrap(&mut self, values: &mut ValueTable<S>, next_state: &S) -> f64;

    /// Hook run after `values[state][action]` has been revised.
    fn after_update(&mut self, _state: &S, _action: usize) {}

    fn visit_entries(&self) -> Option<Vec<TableEntry<S, u64>>> {
        None
    }

    fn restore_visits(&mut self, _width: usize, _entries: Vec<TableEntry<S, u64>>) {}
}

/// Serialized form of a tabular agent's learned state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabularSnapshot<S> {
    pub algorithm: String,
    pub config: TabularConfig,
    pub epsilon: f64,
    pub episode_count: usize,
    pub width: usize,
    pub values: Vec<TableEntry<S, f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visits: Option<Vec<TableEntry<S, u64>>>,
}

/// Epsilon-greedy agent over a lazily grown value table, generic over the
/// bootstrap rule used when learning from an episode.
pub struct TabularAgent<S: GameState, R: UpdateRule<S>> {
    values: ValueTable<S>,
    rule: R,
    config: TabularConfig,
    epsilon: f64,
    episode_count: usize,
    rng: StdRng,
}

impl<S: GameState, R: UpdateRule<S>> TabularAgent<S, R> {
    pub fn new(num_actions: usize, config: TabularConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        TabularAgent {
            values: ValueTable::new(num_actions),
            rule: R::new(num_actions),
            epsilon: config.epsilon,
            config,
            episode_count: 0,
            rng,
        }
    }

    pub fn config(&self) -> &TabularConfig {
        &self.config
    }

    /// Swap in new hyperparameters, keeping the learned tables and episode
    /// count. Epsilon is re-read from the schedule; a seed reseeds the RNG.
    pub fn reconfigure(&mut self, config: TabularConfig) {
        if let Some(seed) = config.seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        self.epsilon = config.epsilon_at(self.episode_count);
        self.config = config;
    }

    pub fn num_actions(&self) -> usize {
        self.values.width()
    }

    pub fn values(&self) -> &ValueTable<S> {
        &self.values
    }

    pub fn rule(&self) -> &R {
        &self.rule
    }

    /// Materialized value row for `state` (zeros if unseen).
    pub fn action_values(&mut self, state: &S) -> &[f64] {
        self.values.row(state)
    }

    fn legal_actions(&self, state: &S) -> Result<Vec<usize>, AgentError> {
        let legal = state.possible_actions();
        if legal.is_empty() {
            return Err(AgentError::NoLegalActions);
        }
        let width = self.values.width();
        if let Some(&action) = legal.iter().find(|&&a| a >= width) {
            return Err(AgentError::ActionOutOfRange { action, width });
        }
        Ok(legal)
    }

    /// Uniformly random legal action.
    fn choose_random_action(&mut self, state: &S) -> Result<usize, AgentError> {
        let legal = self.legal_actions(state)?;
        legal
            .choose(&mut self.rng)
            .copied()
            .ok_or(AgentError::NoLegalActions)
    }

    /// Best-valued legal action, ties broken uniformly at random.
    fn choose_top_action(&mut self, state: &S) -> Result<usize, AgentError> {
        let legal = self.legal_actions(state)?;
        let row = self.values.row(state);
        let best = legal
            .iter()
            .map(|&a| row[a])
            .fold(f64::NEG_INFINITY, f64::max);
        let top: Vec<usize> = legal.into_iter().filter(|&a| row[a] == best).collect();
        top.choose(&mut self.rng)
            .copied()
            .ok_or(AgentError::NoLegalActions)
    }

    /// Revise `values[state][action]` from one transition. `next_state` is
    /// `None` for the final move of an episode.
    fn update_table(&mut self, state: &S, action: usize, reward: f64, next_state: Option<&S>) {
        let target = match next_state {
            None => reward,
            Some(next) => {
                let future =
                    self.config.discount_factor * self.rule.bootstrap(&mut self.values, next);
                match self.config.bootstrap_sign {
                    BootstrapSign::Subtract => reward - future,
                    BootstrapSign::Add => reward + future,
                }
            }
        };
        let learning_rate = self.config.learning_rate;
        let value = &mut self.values.row_mut(state)[action];
        *value += learning_rate * (target - *value);
        self.rule.after_update(state, action);
    }
}

impl<S: GameState, R: UpdateRule<S>> Agent<S> for TabularAgent<S, R> {
    fn choose_train_action(&mut self, state: &S) -> Result<usize, AgentError> {
        if self.rng.random::<f64>() < self.epsilon {
            self.choose_random_action(state)
        } else {
            self.choose_top_action(state)
        }
    }

    fn choose_test_action(&mut self, state: &S) -> Result<usize, AgentError> {
        self.choose_top_action(state)
    }

    fn name(&self) -> &str {
        R::AGENT_NAME
    }
}

impl<S: GameState, R: UpdateRule<S>> LearningAgent<S> for TabularAgent<S, R> {
    fn update_table_with_game(
        &mut self,
        states: &[S],
        actions: &[usize],
        rewards: &[f64],
    ) -> Result<(), AgentError> {
        if states.len() != actions.len() || states.len() != rewards.len() {
            return Err(AgentError::EpisodeLengthMismatch {
                states: states.len(),
                actions: actions.len(),
                rewards: rewards.len(),
            });
        }
        let width = self.values.width();
        if let Some(&action) = actions.iter().find(|&&a| a >= width) {
            return Err(AgentError::ActionOutOfRange { action, width });
        }

        let mut next_state: Option<&S> = None;
        for ((state, &action), &reward) in states.iter().zip(actions).zip(rewards).rev() {
            self.update_table(state, action, reward, next_state);
            next_state = Some(state);
        }

        self.episode_count += 1;
        if self.config.epsilon_decay_episodes > 0 {
            self.epsilon = self.config.epsilon_at(self.episode_count);
        }
        Ok(())
    }
}

impl<S, R> TrainableAgent<S> for TabularAgent<S, R>
where
    S: GameState + Serialize + DeserializeOwned,
    R: UpdateRule<S>,
{
    fn algorithm_name(&self) -> &str {
        R::ALGORITHM
    }

    fn episode_count(&self) -> usize {
        self.episode_count
    }

    fn epsilon(&self) -> f64 {
        self.epsilon
    }

    fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon;
    }

    fn table_size(&self) -> usize {
        self.values.len()
    }

    fn hyperparameters(&self) -> CheckpointHyperparameters {
        CheckpointHyperparameters {
            learning_rate: self.config.learning_rate,
            discount_factor: self.config.discount_factor,
            epsilon: self.epsilon,
            epsilon_start: self.config.epsilon,
            epsilon_end: self.config.epsilon_end,
            epsilon_decay_episodes: self.config.epsilon_decay_episodes,
            bootstrap_sign: self.config.bootstrap_sign,
        }
    }

    fn table_json(&self) -> Result<String, serde_json::Error> {
        let snapshot = TabularSnapshot {
            algorithm: R::ALGORITHM.to_string(),
            config: self.config.clone(),
            epsilon: self.epsilon,
            episode_count: self.episode_count,
            width: self.values.width(),
            values: self.values.to_entries(),
            visits: self.rule.visit_entries(),
        };
        serde_json::to_string(&snapshot)
    }

    fn restore_table_json(&mut self, json: &str) -> Result<(), serde_json::Error> {
        let snapshot: TabularSnapshot<S> = serde_json::from_str(json)?;
        if snapshot.algorithm != R::ALGORITHM {
            return Err(<serde_json::Error as serde::de::Error>::custom(format!(
                "snapshot algorithm '{}' does not match '{}'",
                snapshot.algorithm,
                R::ALGORITHM
            )));
        }
        let width = snapshot.width;
        self.values = ValueTable::from_entries(width, snapshot.values);
        self.rule = R::new(width);
        if let Some(visits) = snapshot.visits {
            self.rule.restore_visits(width, visits);
        }
        self.config = snapshot.config;
        self.epsilon = snapshot.epsilon;
        self.episode_count = snapshot.episode_count;
        Ok(())
    }
}
