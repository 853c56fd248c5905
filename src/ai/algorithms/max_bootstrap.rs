use super::tabular::{TabularAgent, UpdateRule};
use crate::ai::table::ValueTable;
use crate::game::GameState;

/// Bootstraps from the best value of the successor state.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxBootstrap;

impl<S: GameState> UpdateRule<S> for MaxBootstrap {
    const ALGORITHM: &'static str = "max";
    const AGENT_NAME: &'static str = "EpsGreedy";

    fn new(_width: usize) -> Self {
        MaxBootstrap
    }

    fn bootstrap(&mut self, values: &mut ValueTable<S>, next_state: &S) -> f64 {
        values.max_value(next_state)
    }
}

/// Epsilon-greedy agent with max-bootstrap updates.
pub type EpsGreedyAgent<S> = TabularAgent<S, MaxBootstrap>;
