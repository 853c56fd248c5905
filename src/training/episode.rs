use crate::ai::{Agent, LearningAgent, RandomAgent};
use crate::error::{EnvError, TrainingError};
use crate::game::{Connect4, Connect4State, Environment, GameOutcome, Player};
use crate::training::metrics::EpisodeResult;

/// Drive `env` to termination with the agent's training policy, then let the
/// agent learn from the recorded history. Returns the number of moves played.
pub fn run_episode<E, A>(env: &mut E, agent: &mut A) -> Result<usize, TrainingError>
where
    E: Environment,
    A: LearningAgent<E::State> + ?Sized,
{
    env.reset();
    while !env.is_terminated() {
        let action = agent.choose_train_action(env.current_state())?;
        env.step(action)?;
    }
    agent.update_table_with_game(env.states(), env.actions(), env.rewards())?;
    Ok(env.actions().len())
}

/// Play one Connect Four self-play episode. Agent plays both sides.
pub fn play_episode<A>(
    env: &mut Connect4,
    agent: &mut A,
) -> Result<EpisodeResult, TrainingError>
where
    A: LearningAgent<Connect4State> + ?Sized,
{
    let game_length = run_episode(env, agent)?;
    let outcome = env.outcome().ok_or(EnvError::Terminated)?;
    log::debug!("{:?} after {} moves\n{}", outcome, game_length, env.current_state());
    Ok(EpisodeResult {
        outcome,
        game_length,
    })
}

/// Play a single evaluation game between two agents using their test policies.
/// Returns Some(true) if agent won, Some(false) if agent lost, None if draw.
pub fn play_eval_game<A, O>(
    agent: &mut A,
    opponent: &mut O,
    agent_first: bool,
) -> Result<Option<bool>, TrainingError>
where
    A: Agent<Connect4State> + ?Sized,
    O: Agent<Connect4State> + ?Sized,
{
    let agent_player = if agent_first { Player::One } else { Player::Two };
    let mut env = Connect4::new();

    while !env.is_terminated() {
        let state = env.current_state();
        let action = if state.turn() == agent_player {
            agent.choose_test_action(state)?
        } else {
            opponent.choose_test_action(state)?
        };
        env.step(action)?;
    }

    Ok(match env.outcome() {
        Some(GameOutcome::Winner(winner)) => Some(winner == agent_player),
        Some(GameOutcome::InvalidMove(offender)) => Some(offender != agent_player),
        Some(GameOutcome::Draw) | None => None,
    })
}

/// Greedy win rate against a uniformly random opponent, alternating sides.
/// A seed makes the opponent's moves reproducible.
pub fn evaluate<A>(
    agent: &mut A,
    eval_games: usize,
    opponent_seed: Option<u64>,
) -> Result<f32, TrainingError>
where
    A: Agent<Connect4State> + ?Sized,
{
    if eval_games == 0 {
        return Ok(0.0);
    }
    let mut random = match opponent_seed {
        Some(seed) => RandomAgent::with_seed(seed),
        None => RandomAgent::new(),
    };
    let mut wins = 0;

    for game_idx in 0..eval_games {
        let agent_first = game_idx % 2 == 0;
        if let Some(true) = play_eval_game(agent, &mut random, agent_first)? {
            wins += 1;
        }
    }

    Ok(wins as f32 / eval_games as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{EpsAverageAgent, EpsGreedyAgent, TabularConfig, TrainableAgent};
    use crate::error::AgentError;
    use crate::game::COLS;

    /// Plays a fixed column sequence and records what it was taught.
    struct ScriptedAgent {
        moves: Vec<usize>,
        next: usize,
        learned: Option<(usize, Vec<f64>)>,
    }

    impl ScriptedAgent {
        fn new(moves: &[usize]) -> Self {
            ScriptedAgent {
                moves: moves.to_vec(),
                next: 0,
                learned: None,
            }
        }
    }

    impl Agent<Connect4State> for ScriptedAgent {
        fn choose_train_action(&mut self, _state: &Connect4State) -> Result<usize, AgentError> {
            let action = self.moves[self.next % self.moves.len()];
            self.next += 1;
            Ok(action)
        }

        fn choose_test_action(&mut self, state: &Connect4State) -> Result<usize, AgentError> {
            self.choose_train_action(state)
        }

        fn name(&self) -> &str {
            "Scripted"
        }
    }

    impl LearningAgent<Connect4State> for ScriptedAgent {
        fn update_table_with_game(
            &mut self,
            states: &[Connect4State],
            _actions: &[usize],
            rewards: &[f64],
        ) -> Result<(), AgentError> {
            self.learned = Some((states.len(), rewards.to_vec()));
            Ok(())
        }
    }

    #[test]
    fn test_play_episode_hands_history_to_agent() {
        let mut env = Connect4::new();
        let mut agent = ScriptedAgent::new(&[0, 1, 0, 1, 0, 1, 0]);
        let result = play_episode(&mut env, &mut agent).unwrap();

        assert_eq!(result.game_length, 7);
        assert_eq!(result.outcome, GameOutcome::Winner(Player::One));
        let (states, rewards) = agent.learned.unwrap();
        assert_eq!(states, 7);
        assert_eq!(rewards, vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_play_episode_ends_on_invalid_move() {
        let mut env = Connect4::new();
        let mut agent = ScriptedAgent::new(&[2]);
        let result = play_episode(&mut env, &mut agent).unwrap();

        assert_eq!(result.game_length, 7);
        assert_eq!(result.outcome, GameOutcome::InvalidMove(Player::One));
        let (_, rewards) = agent.learned.unwrap();
        assert_eq!(rewards.last(), Some(&-1.0));
    }

    #[test]
    fn test_tabular_self_play_grows_table() {
        let mut env = Connect4::new();
        let mut agent: EpsGreedyAgent<Connect4State> = EpsGreedyAgent::new(
            COLS,
            TabularConfig {
                epsilon: 0.5,
                seed: Some(17),
                ..Default::default()
            },
        );
        let mut total_moves = 0;
        for _ in 0..20 {
            let result = play_episode(&mut env, &mut agent).unwrap();
            assert!(!matches!(result.outcome, GameOutcome::InvalidMove(_)));
            total_moves += result.game_length;
        }
        assert_eq!(agent.episode_count(), 20);
        assert!(agent.table_size() > 0);
        assert!(agent.table_size() <= total_moves);
    }

    #[test]
    fn test_play_eval_game_scores_from_agent_side() {
        // Agent stacks column 0, opponent column 1: first mover wins.
        let mut agent = ScriptedAgent::new(&[0]);
        let mut opponent = ScriptedAgent::new(&[1]);
        assert_eq!(play_eval_game(&mut agent, &mut opponent, true).unwrap(), Some(true));

        let mut agent = ScriptedAgent::new(&[0]);
        let mut opponent = ScriptedAgent::new(&[1]);
        assert_eq!(play_eval_game(&mut agent, &mut opponent, false).unwrap(), Some(false));
    }

    #[test]
    fn test_evaluate_returns_rate() {
        let mut agent: EpsAverageAgent<Connect4State> =
            EpsAverageAgent::new(COLS, TabularConfig::default());
        let rate = evaluate(&mut agent, 10, None).unwrap();
        assert!((0.0..=1.0).contains(&rate));
        assert_eq!(evaluate(&mut agent, 0, None).unwrap(), 0.0);
    }

    #[test]
    fn test_seeded_evaluation_is_reproducible() {
        let config = TabularConfig {
            seed: Some(5),
            ..Default::default()
        };
        let mut outcomes = Vec::new();
        for _ in 0..2 {
            let mut agent: EpsGreedyAgent<Connect4State> =
                EpsGreedyAgent::new(COLS, config.clone());
            let mut random = RandomAgent::with_seed(9);
            let games: Vec<Option<bool>> = (0..6)
                .map(|i| play_eval_game(&mut agent, &mut random, i % 2 == 0).unwrap())
                .collect();
            let rate = evaluate(&mut agent, 20, Some(9)).unwrap();
            outcomes.push((games, rate));
        }
        assert_eq!(outcomes[0], outcomes[1]);
    }
}
