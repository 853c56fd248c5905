//! Game environments: the generic state/environment contracts and the Connect
//! Four instantiation (three-plane board, win detection, episode recording).

mod board;
mod env;
mod player;
mod state;
mod traits;
pub mod win;

pub use board::{Board, Cell, Plane, COLS, EMPTY_PLANE, ROWS};
pub use env::{Connect4, GameOutcome, INVALID_MOVE_REWARD, WIN_REWARD};
pub use player::Player;
pub use state::Connect4State;
pub use traits::{Environment, GameState};
