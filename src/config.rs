use std::path::Path;

use crate::ai::{Algorithm, TabularConfig};
use crate::checkpoint::CheckpointManagerConfig;
use crate::error::ConfigError;
use crate::training::trainer::TrainerConfig;

/// The `[agent]` section: which update rule plus its hyperparameters.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub algorithm: Algorithm,
    #[serde(flatten)]
    pub tabular: TabularConfig,
}

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub agent: AgentConfig,
    pub training: TrainerConfig,
    pub checkpoint: CheckpointManagerConfig,
}

/// Command-line overrides for `[agent]`, kept separate so they can be
/// re-applied over hyperparameters restored from a checkpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AgentOverrides {
    pub learning_rate: Option<f64>,
    pub epsilon: Option<f64>,
    pub seed: Option<u64>,
}

impl AgentOverrides {
    pub fn is_empty(&self) -> bool {
        self.learning_rate.is_none() && self.epsilon.is_none() && self.seed.is_none()
    }

    pub fn apply(&self, config: &mut TabularConfig) {
        if let Some(lr) = self.learning_rate {
            config.learning_rate = lr;
        }
        if let Some(eps) = self.epsilon {
            config.epsilon = eps;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
    }
}

fn check_unit(name: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::Validation(format!("{name} must be in [0, 1]")));
    }
    Ok(())
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            log::warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let agent = &self.agent.tabular;
        check_unit("agent.epsilon", agent.epsilon)?;
        check_unit("agent.epsilon_end", agent.epsilon_end)?;
        check_unit("agent.discount_factor", agent.discount_factor)?;
        if agent.learning_rate <= 0.0 || agent.learning_rate > 1.0 {
            return Err(ConfigError::Validation(
                "agent.learning_rate must be in (0, 1]".into(),
            ));
        }
        if agent.epsilon_decay_episodes > 0 && agent.epsilon_end > agent.epsilon {
            return Err(ConfigError::Validation(
                "agent.epsilon_end must be <= agent.epsilon when decaying".into(),
            ));
        }

        if self.training.num_episodes == 0 {
            return Err(ConfigError::Validation(
                "training.num_episodes must be > 0".into(),
            ));
        }
        if self.training.eval_interval > 0 && self.training.eval_games == 0 {
            return Err(ConfigError::Validation(
                "training.eval_games must be > 0 when evaluation is enabled".into(),
            ));
        }
        if self.training.checkpoint_interval > 0 && self.checkpoint.keep_last_n == 0 {
            return Err(ConfigError::Validation(
                "checkpoint.keep_last_n must be >= 1".into(),
            ));
        }

        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&AppConfig::default())
    }
}
