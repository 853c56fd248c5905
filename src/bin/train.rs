use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use otterconnect::ai::algorithms::UpdateRule;
use otterconnect::ai::{
    Agent, Algorithm, EpsAverageAgent, EpsGreedyAgent, TabularAgent, TrainableAgent,
};
use otterconnect::checkpoint::{CheckpointManager, CheckpointManagerConfig};
use otterconnect::config::{AgentOverrides, AppConfig};
use otterconnect::game::{Connect4State, COLS};
use otterconnect::training::trainer::Trainer;

/// Train a tabular Connect Four agent via self-play.
#[derive(Parser)]
#[command(name = "train", about = "Train a tabular Connect Four agent")]
struct Cli {
    /// Update rule: max (EpsGreedy) or expectation (EpsAverage)
    #[arg(long)]
    algorithm: Option<Algorithm>,

    /// Resume training from the latest checkpoint
    #[arg(long)]
    resume: bool,

    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Override number of training episodes
    #[arg(long)]
    episodes: Option<usize>,

    /// Override learning rate
    #[arg(long)]
    lr: Option<f64>,

    /// Override exploration rate
    #[arg(long)]
    eps: Option<f64>,

    /// Seed the agent's RNG
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    // Load configuration
    let mut app_config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(algorithm) = cli.algorithm {
        app_config.agent.algorithm = algorithm;
    }
    if let Some(episodes) = cli.episodes {
        app_config.training.num_episodes = episodes;
    }
    let overrides = AgentOverrides {
        learning_rate: cli.lr,
        epsilon: cli.eps,
        seed: cli.seed,
    };
    overrides.apply(&mut app_config.agent.tabular);
    app_config
        .validate()
        .context("validating configuration after overrides")?;

    let tabular = app_config.agent.tabular.clone();
    match app_config.agent.algorithm {
        Algorithm::Max => {
            let agent: EpsGreedyAgent<Connect4State> = EpsGreedyAgent::new(COLS, tabular);
            run(agent, &app_config, cli.resume.then_some(overrides))
        }
        Algorithm::Expectation => {
            let agent: EpsAverageAgent<Connect4State> = EpsAverageAgent::new(COLS, tabular);
            run(agent, &app_config, cli.resume.then_some(overrides))
        }
    }
}

/// Train `agent`, first resuming it when `resume` carries the CLI overrides to
/// re-apply over the restored hyperparameters.
fn run<R: UpdateRule<Connect4State>>(
    mut agent: TabularAgent<Connect4State, R>,
    config: &AppConfig,
    resume: Option<AgentOverrides>,
) -> Result<()> {
    let checkpoint_config = CheckpointManagerConfig {
        checkpoint_dir: config.training.checkpoint_dir.clone(),
        ..config.checkpoint.clone()
    };
    if let Some(overrides) = resume {
        if resume_agent(&mut agent, &checkpoint_config)? && !overrides.is_empty() {
            let mut restored = agent.config().clone();
            overrides.apply(&mut restored);
            log::info!("Applying command-line overrides to restored hyperparameters");
            agent.reconfigure(restored);
        }
    }

    let trainer = Trainer::new(config.training.clone(), checkpoint_config)
        .with_eval_seed(agent.config().seed);
    let summary = trainer.train(&mut agent).context("training")?;
    log::info!(
        "{} finished at episode {} with {} states learned",
        agent.name(),
        summary.final_episode,
        summary.table_size
    );
    Ok(())
}

/// Resume an agent from the latest checkpoint. Returns false when none exists
/// and the agent starts fresh.
fn resume_agent<A: TrainableAgent<Connect4State>>(
    agent: &mut A,
    checkpoint_config: &CheckpointManagerConfig,
) -> Result<bool> {
    let manager = CheckpointManager::new(checkpoint_config.clone());
    match manager.load_latest() {
        Ok(data) => {
            data.restore_into(agent)
                .with_context(|| format!("restoring checkpoint {}", data.path.display()))?;
            log::info!("Resumed from episode {}", data.metadata.episode);
            Ok(true)
        }
        Err(e) => {
            log::info!("No checkpoint found ({}), starting fresh", e);
            Ok(false)
        }
    }
}
