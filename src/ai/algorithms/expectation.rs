use super::tabular::{TabularAgent, UpdateRule};
use crate::ai::table::{TableEntry, ValueTable, VisitTable};
use crate::game::GameState;

/// Bootstraps from the visit-weighted mean of the successor's action values.
#[derive(Debug, Clone)]
pub struct ExpectationBootstrap<S: GameState> {
    visits: VisitTable<S>,
}

impl<S: GameState> ExpectationBootstrap<S> {
    pub fn visits(&self) -> &VisitTable<S> {
        &self.visits
    }
}

impl<S: GameState> UpdateRule<S> for ExpectationBootstrap<S> {
    const ALGORITHM: &'static str = "expectation";
    const AGENT_NAME: &'static str = "EpsAverage";

    fn new(width: usize) -> Self {
        ExpectationBootstrap {
            visits: VisitTable::new(width),
        }
    }

    fn bootstrap(&mut self, values: &mut ValueTable<S>, next_state: &S) -> f64 {
        let visits = self.visits.row(next_state);
        let total: u64 = visits.iter().sum();
        // The successor is always updated first in a backward pass, so this
        // only happens for externally seeded tables.
        if total == 0 {
            return 0.0;
        }
        let weighted: f64 = values
            .row(next_state)
            .iter()
            .zip(visits)
            .map(|(&value, &count)| value * count as f64)
            .sum();
        weighted / total as f64
    }

    fn after_update(&mut self, state: &S, action: usize) {
        self.visits.row_mut(state)[action] += 1;
    }

    fn visit_entries(&self) -> Option<Vec<TableEntry<S, u64>>> {
        Some(self.visits.to_entries())
    }

    fn restore_visits(&mut self, width: usize, entries: Vec<TableEntry<S, u64>>) {
        self.visits = VisitTable::from_entries(width, entries);
    }
}

/// Epsilon-greedy agent with expectation-bootstrap updates.
pub type EpsAverageAgent<S> = TabularAgent<S, ExpectationBootstrap<S>>;
