use std::path::PathBuf;

/// Precondition violations when driving an environment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvError {
    #[error("action {action} is outside the action space [0, {width})")]
    InvalidAction { action: usize, width: usize },

    #[error("environment has terminated; call reset before stepping again")]
    Terminated,
}

/// Errors raised by agents when choosing actions or learning from an episode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    #[error("state has no legal actions")]
    NoLegalActions,

    #[error("episode sequences differ in length (states: {states}, actions: {actions}, rewards: {rewards})")]
    EpisodeLengthMismatch {
        states: usize,
        actions: usize,
        rewards: usize,
    },

    #[error("action {action} is outside the value table width {width}")]
    ActionOutOfRange { action: usize, width: usize },
}

/// Errors that can occur during checkpoint operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("no 'latest' symlink found in {0}")]
    NoLatestSymlink(PathBuf),

    #[error("failed to read {path}: {source}")]
    MetadataRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    MetadataParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("checkpoint was written by {found}, expected {expected}")]
    AlgorithmMismatch { expected: String, found: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur during training.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("environment error: {0}")]
    Env(#[from] EnvError),

    #[error("agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
