use std::fmt;

use serde::{Deserialize, Serialize};

use super::board::{Board, Cell, COLS, ROWS};
use super::player::Player;
use super::traits::GameState;

/// Board contents plus the player to move.
///
/// `board` is `None` only for the sentinel produced by an illegal move.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connect4State {
    board: Option<Board>,
    turn: Player,
}

impl Connect4State {
    /// Create initial game state
    pub fn initial() -> Self {
        Connect4State {
            board: Some(Board::new()),
            turn: Player::One,
        }
    }

    pub fn from_parts(board: Board, turn: Player) -> Self {
        Connect4State {
            board: Some(board),
            turn,
        }
    }

    /// The sentinel state reached by dropping into a full column.
    pub(crate) fn invalid(turn: Player) -> Self {
        Connect4State { board: None, turn }
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    /// Player to move next
    pub fn turn(&self) -> Player {
        self.turn
    }

    pub fn is_invalid(&self) -> bool {
        self.board.is_none()
    }

    /// Copy-on-transition: returns the successor state, or `None` when the
    /// column is full. Panics on `col >= COLS`.
    pub(crate) fn with_drop(&self, col: usize) -> Option<Connect4State> {
        let mut board = self.board.clone()?;
        board.drop_piece(col, self.turn)?;
        Some(Connect4State {
            board: Some(board),
            turn: self.turn.other(),
        })
    }
}

impl Default for Connect4State {
    fn default() -> Self {
        Self::initial()
    }
}

impl GameState for Connect4State {
    fn possible_actions(&self) -> Vec<usize> {
        match &self.board {
            Some(board) => (0..COLS).filter(|&col| !board.is_column_full(col)).collect(),
            None => Vec::new(),
        }
    }
}

impl fmt::Display for Connect4State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(board) = &self.board else {
            return writeln!(f, "Invalid state position was found.");
        };
        for row in (0..ROWS).rev() {
            write!(f, "|")?;
            for col in 0..COLS {
                let glyph = match board.get(col, row) {
                    Cell::Empty => ' ',
                    Cell::Occupied(player) => player.symbol(),
                };
                write!(f, "{glyph}|")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
