use serde::{Deserialize, Serialize};

use super::player::Player;

pub const ROWS: usize = 6;
pub const COLS: usize = 7;

/// Index of the "empty" indicator plane.
pub const EMPTY_PLANE: usize = 0;

/// A single 0/1 occupancy grid indexed `[column][row]`.
pub type Plane = [[u8; ROWS]; COLS];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Occupied(Player),
}

/// Three one-hot occupancy planes: empty, player one, player two.
///
/// Row 0 is the floor of the board. Every cell has exactly one plane set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    planes: [Plane; 3],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        let mut planes = [[[0u8; ROWS]; COLS]; 3];
        planes[EMPTY_PLANE] = [[1u8; ROWS]; COLS];
        Board { planes }
    }

    /// Get the cell at a specific position
    pub fn get(&self, col: usize, row: usize) -> Cell {
        if self.planes[EMPTY_PLANE][col][row] == 1 {
            Cell::Empty
        } else if self.planes[Player::One.plane()][col][row] == 1 {
            Cell::Occupied(Player::One)
        } else {
            Cell::Occupied(Player::Two)
        }
    }

    /// Borrow one occupancy plane.
    pub fn plane(&self, index: usize) -> &Plane {
        &self.planes[index]
    }

    /// Number of empty cells left in a column.
    pub fn empty_in_column(&self, col: usize) -> usize {
        self.planes[EMPTY_PLANE][col]
            .iter()
            .map(|&v| v as usize)
            .sum()
    }

    /// Check if a column is full
    pub fn is_column_full(&self, col: usize) -> bool {
        self.empty_in_column(col) == 0
    }

    /// Drop a piece for `player` into `col`, returning the row where it
    /// landed, or `None` when the column is already full.
    ///
    /// Panics if `col >= COLS`; callers validate the index first.
    pub fn drop_piece(&mut self, col: usize, player: Player) -> Option<usize> {
        let row = ROWS - self.empty_in_column(col);
        if row == ROWS {
            return None;
        }
        self.planes[EMPTY_PLANE][col][row] = 0;
        self.planes[player.plane()][col][row] = 1;
        Some(row)
    }

    /// Total number of empty cells on the board.
    pub fn empty_count(&self) -> usize {
        (0..COLS).map(|col| self.empty_in_column(col)).sum()
    }

    /// True when every cell has exactly one plane set.
    pub fn is_one_hot(&self) -> bool {
        (0..COLS).all(|col| {
            (0..ROWS).all(|row| self.planes.iter().map(|p| p[col][row]).sum::<u8>() == 1)
        })
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new();
        for col in 0..COLS {
            for row in 0..ROWS {
                assert_eq!(board.get(col, row), Cell::Empty);
            }
        }
        assert_eq!(board.empty_count(), ROWS * COLS);
        assert!(board.is_one_hot());
    }

    #[test]
    fn test_drop_piece() {
        let mut board = Board::new();

        let row = board.drop_piece(3, Player::One).unwrap();
        assert_eq!(row, 0); // floor
        assert_eq!(board.get(3, 0), Cell::Occupied(Player::One));

        let row = board.drop_piece(3, Player::Two).unwrap();
        assert_eq!(row, 1); // stacks on top
        assert_eq!(board.get(3, 1), Cell::Occupied(Player::Two));
        assert!(board.is_one_hot());
    }

    #[test]
    fn test_column_full() {
        let mut board = Board::new();
        for _ in 0..ROWS {
            board.drop_piece(0, Player::One).unwrap();
        }

        assert!(board.is_column_full(0));
        assert!(!board.is_column_full(1));
        let before = board.clone();
        assert_eq!(board.drop_piece(0, Player::Two), None);
        assert_eq!(board, before);
    }

    #[test]
    fn test_one_hot_after_every_drop() {
        let mut board = Board::new();
        let mut player = Player::One;
        for col in 0..COLS {
            for _ in 0..ROWS {
                board.drop_piece(col, player).unwrap();
                assert!(board.is_one_hot());
                player = player.other();
            }
        }
        assert_eq!(board.empty_count(), 0);
    }
}
