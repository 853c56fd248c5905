use std::fmt::Debug;
use std::hash::Hash;

use crate::error::EnvError;

/// A snapshot of a turn-based game, usable as a value-table key.
///
/// Equality and hashing must be by content so that two independently built
/// positions share one table entry.
pub trait GameState: Clone + Eq + Hash + Debug {
    /// Legal action indices for this state, in ascending order.
    fn possible_actions(&self) -> Vec<usize>;
}

/// A game environment that records the episode it is playing.
pub trait Environment {
    type State: GameState;

    /// Size of the action space (every action index is `< num_actions()`).
    fn num_actions(&self) -> usize;

    /// Start a fresh episode.
    fn reset(&mut self);

    /// Apply `action` for the player to move and record the transition.
    fn step(&mut self, action: usize) -> Result<&mut Self, EnvError>;

    fn current_state(&self) -> &Self::State;

    fn is_terminated(&self) -> bool;

    /// Pre-move states of the episode so far, oldest first.
    fn states(&self) -> &[Self::State];

    fn actions(&self) -> &[usize];

    fn rewards(&self) -> &[f64];
}
