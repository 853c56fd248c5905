//! Agents: the agent traits, a uniform random baseline, and the tabular
//! value-learning algorithms with their lazily grown tables.

mod agent;
pub mod algorithms;
mod random;
pub mod table;

pub use agent::{Agent, LearningAgent, TrainableAgent};
pub use algorithms::{
    Algorithm, BootstrapSign, EpsAverageAgent, EpsGreedyAgent, TabularAgent, TabularConfig,
};
pub use random::RandomAgent;
pub use table::{LazyTable, TableEntry, ValueTable, VisitTable};
