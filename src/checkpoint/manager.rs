use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::ai::TrainableAgent;
use crate::checkpoint::metadata::{CheckpointMetadata, CheckpointMetrics};
use crate::error::CheckpointError;
use crate::game::GameState;

const METADATA_FILE: &str = "metadata.json";
const TABLE_FILE: &str = "table.json";
const LATEST_LINK: &str = "latest";
const CHECKPOINT_PREFIX: &str = "checkpoint_";

/// Configuration for the checkpoint manager.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CheckpointManagerConfig {
    /// Taken from `[training]` when loaded from a config file.
    #[serde(skip)]
    pub checkpoint_dir: PathBuf,
    pub keep_last_n: usize,
    pub keep_best_n: usize,
}

impl Default for CheckpointManagerConfig {
    fn default() -> Self {
        CheckpointManagerConfig {
            checkpoint_dir: PathBuf::from("checkpoints"),
            keep_last_n: 5,
            keep_best_n: 3,
        }
    }
}

/// A loaded checkpoint. The agent deserializes its own tables.
#[derive(Debug)]
pub struct CheckpointData {
    pub path: PathBuf,
    pub metadata: CheckpointMetadata,
    pub table_json: String,
}

impl CheckpointData {
    /// Replace the agent's tables with the checkpointed ones.
    pub fn restore_into<S, A>(&self, agent: &mut A) -> Result<(), CheckpointError>
    where
        S: GameState,
        A: TrainableAgent<S> + ?Sized,
    {
        if self.metadata.algorithm != agent.algorithm_name() {
            return Err(CheckpointError::AlgorithmMismatch {
                expected: agent.algorithm_name().to_string(),
                found: self.metadata.algorithm.clone(),
            });
        }
        agent.restore_table_json(&self.table_json)?;
        Ok(())
    }
}

/// Manages saving, loading, listing, and pruning checkpoints.
pub struct CheckpointManager {
    config: CheckpointManagerConfig,
}

impl CheckpointManager {
    pub fn new(config: CheckpointManagerConfig) -> Self {
        CheckpointManager { config }
    }

    pub fn checkpoint_dir(&self) -> &Path {
        &self.config.checkpoint_dir
    }

    /// Write a checkpoint for `agent` at `episode` and return its directory.
    pub fn save_checkpoint<S, A>(
        &self,
        agent: &A,
        metrics: &CheckpointMetrics,
        episode: usize,
    ) -> Result<PathBuf, CheckpointError>
    where
        S: GameState,
        A: TrainableAgent<S> + ?Sized,
    {
        let dir_name = format!("{CHECKPOINT_PREFIX}{episode:07}");
        let tmp_dir = self.config.checkpoint_dir.join(format!("{}.tmp", dir_name));
        let final_dir = self.config.checkpoint_dir.join(&dir_name);

        fs::create_dir_all(&tmp_dir)?;

        fs::write(tmp_dir.join(TABLE_FILE), agent.table_json()?)?;

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let metadata = CheckpointMetadata {
            episode,
            timestamp,
            algorithm: agent.algorithm_name().to_string(),
            metrics: metrics.clone(),
            hyperparameters: agent.hyperparameters(),
        };
        fs::write(
            tmp_dir.join(METADATA_FILE),
            serde_json::to_string_pretty(&metadata)?,
        )?;

        // Atomic rename
        if final_dir.exists() {
            fs::remove_dir_all(&final_dir)?;
        }
        fs::rename(&tmp_dir, &final_dir)?;

        self.update_latest_symlink(&dir_name)?;
        self.prune_old_checkpoints()?;

        log::debug!("wrote checkpoint {}", final_dir.display());
        Ok(final_dir)
    }

    /// Load a checkpoint directory.
    pub fn load_checkpoint(&self, dir: &Path) -> Result<CheckpointData, CheckpointError> {
        let metadata = read_metadata(&dir.join(METADATA_FILE))?;
        let table_path = dir.join(TABLE_FILE);
        let table_json =
            fs::read_to_string(&table_path).map_err(|e| CheckpointError::MetadataRead {
                path: table_path,
                source: e,
            })?;

        Ok(CheckpointData {
            path: dir.to_path_buf(),
            metadata,
            table_json,
        })
    }

    /// Load the checkpoint the `latest` symlink points at.
    pub fn load_latest(&self) -> Result<CheckpointData, CheckpointError> {
        let link = self.config.checkpoint_dir.join(LATEST_LINK);
        let target = match fs::read_link(&link) {
            Ok(target) => target,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CheckpointError::NoLatestSymlink(
                    self.config.checkpoint_dir.clone(),
                ))
            }
            Err(e) => return Err(e.into()),
        };
        // an absolute target replaces the base
        self.load_checkpoint(&self.config.checkpoint_dir.join(target))
    }

    /// List all checkpoints sorted by episode (ascending). A missing
    /// checkpoint directory lists as empty.
    pub fn list_checkpoints(&self) -> Result<Vec<(PathBuf, CheckpointMetadata)>, CheckpointError> {
        if !self.config.checkpoint_dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut found = Vec::new();
        for entry in fs::read_dir(&self.config.checkpoint_dir)? {
            let path = entry?.path();
            let named = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(episode_of)
                .is_some();
            let meta_path = path.join(METADATA_FILE);
            if named && meta_path.is_file() {
                found.push((path, read_metadata(&meta_path)?));
            }
        }
        found.sort_by_key(|(_, metadata)| metadata.episode);
        Ok(found)
    }

    /// Delete every checkpoint that is neither among the last `keep_last_n`
    /// nor the best `keep_best_n` by eval win rate. The newest always stays.
    fn prune_old_checkpoints(&self) -> Result<(), CheckpointError> {
        let checkpoints = self.list_checkpoints()?;
        let recent_from = checkpoints
            .len()
            .saturating_sub(self.config.keep_last_n.max(1));

        let mut ranked: Vec<usize> = (0..checkpoints.len()).collect();
        ranked.sort_by(|&a, &b| {
            let rate = |i: usize| checkpoints[i].1.metrics.win_rate;
            rate(b).total_cmp(&rate(a))
        });
        let best: HashSet<usize> = ranked.into_iter().take(self.config.keep_best_n).collect();

        for (i, (path, _)) in checkpoints.iter().enumerate().take(recent_from) {
            if !best.contains(&i) {
                fs::remove_dir_all(path)?;
                log::debug!("pruned checkpoint {}", path.display());
            }
        }
        Ok(())
    }

    /// Repoint `latest` at `dir_name`: staged under a temporary name, then
    /// renamed over the old link.
    fn update_latest_symlink(&self, dir_name: &str) -> Result<(), CheckpointError> {
        let staged = self
            .config
            .checkpoint_dir
            .join(format!("{LATEST_LINK}.tmp"));
        if staged.symlink_metadata().is_ok() {
            fs::remove_file(&staged)?;
        }
        std::os::unix::fs::symlink(dir_name, &staged)?;
        fs::rename(&staged, self.config.checkpoint_dir.join(LATEST_LINK))?;
        Ok(())
    }
}

/// Episode number of a finished checkpoint directory (`checkpoint_0001000`).
/// Staging directories (`.tmp`) and foreign names yield `None`.
fn episode_of(name: &str) -> Option<usize> {
    let digits = name.strip_prefix(CHECKPOINT_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn read_metadata(path: &Path) -> Result<CheckpointMetadata, CheckpointError> {
    let json = fs::read_to_string(path).map_err(|e| CheckpointError::MetadataRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&json).map_err(|e| CheckpointError::MetadataParse {
        path: path.to_path_buf(),
        source: e,
    })
}
