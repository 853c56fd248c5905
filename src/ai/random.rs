use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;

use super::agent::Agent;
use crate::error::AgentError;
use crate::game::GameState;

/// An agent that selects uniformly at random from legal actions.
pub struct RandomAgent {
    rng: StdRng,
}

impl RandomAgent {
    pub fn new() -> Self {
        RandomAgent {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        RandomAgent {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn pick<S: GameState>(&mut self, state: &S) -> Result<usize, AgentError> {
        state
            .possible_actions()
            .choose(&mut self.rng)
            .copied()
            .ok_or(AgentError::NoLegalActions)
    }
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: GameState> Agent<S> for RandomAgent {
    fn choose_train_action(&mut self, state: &S) -> Result<usize, AgentError> {
        self.pick(state)
    }

    fn choose_test_action(&mut self, state: &S) -> Result<usize, AgentError> {
        self.pick(state)
    }

    fn name(&self) -> &str {
        "Random"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Connect4, Connect4State, Environment};

    #[test]
    fn test_random_agent_selects_legal_action() {
        let mut agent = RandomAgent::with_seed(1);
        let mut env = Connect4::new();
        for _ in 0..6 {
            env.step(5).unwrap();
        }
        let state = env.current_state().clone();
        let legal = state.possible_actions();
        assert!(!legal.contains(&5));

        for _ in 0..100 {
            let action = agent.choose_test_action(&state).unwrap();
            assert!(legal.contains(&action), "Action {} is not legal", action);
        }
    }

    #[test]
    fn test_random_agent_plays_full_game() {
        let mut agent1 = RandomAgent::with_seed(7);
        let mut agent2 = RandomAgent::with_seed(8);
        let mut env = Connect4::new();

        let mut turn = 0;
        while !env.is_terminated() {
            let state = env.current_state().clone();
            let action = if turn % 2 == 0 {
                agent1.choose_train_action(&state).unwrap()
            } else {
                agent2.choose_train_action(&state).unwrap()
            };
            env.step(action).unwrap();
            turn += 1;
        }

        assert!(env.outcome().is_some());
        assert!(!env.current_state().is_invalid());
    }

    #[test]
    fn test_no_legal_actions_is_an_error() {
        let mut agent = RandomAgent::with_seed(0);
        let mut env = Connect4::new();
        for _ in 0..7 {
            env.step(0).unwrap();
        }
        assert!(env.current_state().is_invalid());
        let err = agent.choose_test_action(env.current_state()).unwrap_err();
        assert_eq!(err, AgentError::NoLegalActions);
    }

    #[test]
    fn test_random_agent_name() {
        let agent = RandomAgent::new();
        assert_eq!(Agent::<Connect4State>::name(&agent), "Random");
    }
}
