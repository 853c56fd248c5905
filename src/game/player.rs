use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    /// Get the other player
    pub fn other(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Index of this player's occupancy plane on the board.
    pub fn plane(self) -> usize {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }

    /// Board glyph used by the text rendering.
    pub fn symbol(self) -> char {
        match self {
            Player::One => 'o',
            Player::Two => 'x',
        }
    }

    /// Get player name for display
    pub fn name(self) -> &'static str {
        match self {
            Player::One => "Player 1",
            Player::Two => "Player 2",
        }
    }
}
