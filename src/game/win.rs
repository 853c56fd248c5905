//! Four-in-a-row detection over a single occupancy plane.

use super::board::{Plane, COLS, ROWS};

const RUN: usize = 4;

/// Whether a run of four occupied cells starts at `(col, row)` in any of the
/// vertical, horizontal, up-right or up-left directions.
pub fn win_from(plane: &Plane, col: usize, row: usize) -> bool {
    let room_up = row < ROWS - 3;
    let room_right = col < COLS - 3;
    let room_left = col > 2;

    if room_up && (0..RUN).all(|k| plane[col][row + k] == 1) {
        return true;
    }
    if room_right && (0..RUN).all(|k| plane[col + k][row] == 1) {
        return true;
    }
    if room_up && room_right && (0..RUN).all(|k| plane[col + k][row + k] == 1) {
        return true;
    }
    if room_up && room_left && (0..RUN).all(|k| plane[col - k][row + k] == 1) {
        return true;
    }
    false
}

/// Scan every anchor cell of the plane for a four-in-a-row.
pub fn has_four(plane: &Plane) -> bool {
    (0..ROWS).any(|row| (0..COLS).any(|col| win_from(plane, col, row)))
}

/// A board is full when the empty plane sums to zero.
pub fn is_full(empty: &Plane) -> bool {
    empty.iter().flatten().all(|&v| v == 0)
}
