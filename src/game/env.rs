use super::board::{COLS, EMPTY_PLANE};
use super::player::Player;
use super::state::Connect4State;
use super::traits::Environment;
use super::win;
use crate::error::EnvError;

/// Reward for the move that completed a four-in-a-row.
pub const WIN_REWARD: f64 = 1.0;
/// Reward for dropping into a full column.
pub const INVALID_MOVE_REWARD: f64 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Winner(Player),
    Draw,
    /// The given player dropped into a full column.
    InvalidMove(Player),
}

/// Connect Four environment owning the live state and the episode history.
#[derive(Debug, Clone)]
pub struct Connect4 {
    current_state: Connect4State,
    states: Vec<Connect4State>,
    actions: Vec<usize>,
    rewards: Vec<f64>,
    terminated: bool,
}

impl Connect4 {
    pub fn new() -> Self {
        Connect4 {
            current_state: Connect4State::initial(),
            states: Vec::new(),
            actions: Vec::new(),
            rewards: Vec::new(),
            terminated: false,
        }
    }

    /// Reward and terminality of a state, from the perspective of the player
    /// who just moved into it.
    pub fn evaluate(state: &Connect4State) -> (f64, bool) {
        let Some(board) = state.board() else {
            return (INVALID_MOVE_REWARD, true);
        };
        let won = [Player::One, Player::Two]
            .iter()
            .any(|p| win::has_four(board.plane(p.plane())));
        if won {
            return (WIN_REWARD, true);
        }
        if win::is_full(board.plane(EMPTY_PLANE)) {
            return (0.0, true);
        }
        (0.0, false)
    }

    /// How the episode ended, if it has.
    pub fn outcome(&self) -> Option<GameOutcome> {
        if !self.terminated {
            return None;
        }
        let mover = self.states.last()?.turn();
        if self.current_state.is_invalid() {
            Some(GameOutcome::InvalidMove(mover))
        } else if self.rewards.last().copied() == Some(WIN_REWARD) {
            Some(GameOutcome::Winner(mover))
        } else {
            Some(GameOutcome::Draw)
        }
    }
}

impl Default for Connect4 {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for Connect4 {
    type State = Connect4State;

    fn num_actions(&self) -> usize {
        COLS
    }

    fn reset(&mut self) {
        self.current_state = Connect4State::initial();
        self.states.clear();
        self.actions.clear();
        self.rewards.clear();
        self.terminated = false;
    }

    fn step(&mut self, action: usize) -> Result<&mut Self, EnvError> {
        if self.terminated {
            return Err(EnvError::Terminated);
        }
        if action >= COLS {
            return Err(EnvError::InvalidAction {
                action,
                width: COLS,
            });
        }

        let old_state = self.current_state.clone();
        let new_state = old_state
            .with_drop(action)
            .unwrap_or_else(|| Connect4State::invalid(old_state.turn()));
        let (reward, terminated) = Self::evaluate(&new_state);

        self.states.push(old_state);
        self.actions.push(action);
        self.rewards.push(reward);
        self.current_state = new_state;
        self.terminated = terminated;
        Ok(self)
    }

    fn current_state(&self) -> &Connect4State {
        &self.current_state
    }

    fn is_terminated(&self) -> bool {
        self.terminated
    }

    fn states(&self) -> &[Connect4State] {
        &self.states
    }

    fn actions(&self) -> &[usize] {
        &self.actions
    }

    fn rewards(&self) -> &[f64] {
        &self.rewards
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Board, GameState, ROWS};

    fn play(env: &mut Connect4, moves: &[usize]) {
        for &col in moves {
            env.step(col).unwrap();
        }
    }

    /// Build a board column by column, bottom piece first.
    fn board_from_columns(columns: &[(usize, &[Player])]) -> Board {
        let mut board = Board::new();
        for &(col, pieces) in columns {
            for &p in pieces {
                board.drop_piece(col, p).unwrap();
            }
        }
        board
    }

    use Player::{One as A, Two as B};

    #[test]
    fn test_reset_clears_history() {
        let mut env = Connect4::new();
        play(&mut env, &[3, 3, 4]);
        env.reset();
        assert_eq!(env.current_state(), &Connect4State::initial());
        assert!(env.states().is_empty());
        assert!(env.actions().is_empty());
        assert!(env.rewards().is_empty());
        assert!(!env.is_terminated());
    }

    #[test]
    fn test_step_records_pre_move_state() {
        let mut env = Connect4::new();
        env.step(3).unwrap().step(2).unwrap();

        assert_eq!(env.states().len(), 2);
        assert_eq!(env.states()[0], Connect4State::initial());
        assert_eq!(env.states()[1].turn(), Player::Two);
        assert_eq!(env.actions(), &[3, 2]);
        assert_eq!(env.rewards(), &[0.0, 0.0]);
        assert_eq!(env.current_state().turn(), Player::One);
        assert!(env.current_state().board().unwrap().is_one_hot());
    }

    #[test]
    fn test_history_does_not_alias_later_moves() {
        let mut env = Connect4::new();
        play(&mut env, &[0, 0, 0]);
        let first = &env.states()[0];
        assert_eq!(first.board().unwrap().empty_count(), ROWS * 7);
    }

    #[test]
    fn test_vertical_win() {
        let mut env = Connect4::new();
        play(&mut env, &[0, 1, 0, 1, 0, 1, 0]);
        assert!(env.is_terminated());
        assert_eq!(env.rewards().last(), Some(&1.0));
        assert_eq!(env.outcome(), Some(GameOutcome::Winner(Player::One)));
    }

    #[test]
    fn test_horizontal_win() {
        let mut env = Connect4::new();
        play(&mut env, &[0, 0, 1, 1, 2, 2, 3]);
        assert!(env.is_terminated());
        assert_eq!(env.outcome(), Some(GameOutcome::Winner(Player::One)));
    }

    #[test]
    fn test_second_player_win_is_still_positive() {
        let mut env = Connect4::new();
        play(&mut env, &[0, 1, 0, 1, 0, 1, 6, 1]);
        assert!(env.is_terminated());
        assert_eq!(env.rewards().last(), Some(&1.0));
        assert_eq!(env.outcome(), Some(GameOutcome::Winner(Player::Two)));
    }

    #[test]
    fn test_evaluate_diagonal_up_right() {
        let board = board_from_columns(&[
            (0, &[A]),
            (1, &[B, A]),
            (2, &[B, B, A]),
            (3, &[B, A, B, A]),
        ]);
        let state = Connect4State::from_parts(board, Player::Two);
        assert_eq!(Connect4::evaluate(&state), (1.0, true));
    }

    #[test]
    fn test_evaluate_diagonal_up_left() {
        let board = board_from_columns(&[
            (6, &[A]),
            (5, &[B, A]),
            (4, &[B, B, A]),
            (3, &[B, A, B, A]),
        ]);
        let state = Connect4State::from_parts(board, Player::Two);
        assert_eq!(Connect4::evaluate(&state), (1.0, true));
    }

    #[test]
    fn test_evaluate_vertical_and_horizontal() {
        let vertical = board_from_columns(&[(5, &[B, B, B, B])]);
        let state = Connect4State::from_parts(vertical, Player::One);
        assert_eq!(Connect4::evaluate(&state), (1.0, true));

        let horizontal = board_from_columns(&[(1, &[A]), (2, &[A]), (3, &[A]), (4, &[A])]);
        let state = Connect4State::from_parts(horizontal, Player::Two);
        assert_eq!(Connect4::evaluate(&state), (1.0, true));
    }

    #[test]
    fn test_blocked_three_is_not_terminal() {
        let board = board_from_columns(&[(0, &[B]), (1, &[A]), (2, &[A]), (3, &[A]), (4, &[B])]);
        let state = Connect4State::from_parts(board, Player::One);
        assert_eq!(Connect4::evaluate(&state), (0.0, false));
    }

    #[test]
    fn test_full_board_without_four_is_draw() {
        // Pairs of rows alternate owner and neighbouring columns are offset,
        // so no line longer than two exists in any direction.
        let mut board = Board::new();
        for col in 0..7 {
            for row in 0..ROWS {
                let player = if (row / 2 + col) % 2 == 0 { A } else { B };
                board.drop_piece(col, player).unwrap();
            }
        }
        assert!(board.is_one_hot());
        let state = Connect4State::from_parts(board, Player::One);
        assert_eq!(Connect4::evaluate(&state), (0.0, true));
    }

    #[test]
    fn test_full_column_is_invalid_move() {
        let mut env = Connect4::new();
        play(&mut env, &[0, 0, 0, 0, 0, 0]);
        assert!(!env.is_terminated());
        assert!(!env.current_state().possible_actions().contains(&0));

        env.step(0).unwrap();
        assert!(env.is_terminated());
        assert!(env.current_state().is_invalid());
        assert_eq!(env.rewards().last(), Some(&-1.0));
        // no turn flip on the illegal transition
        assert_eq!(env.current_state().turn(), Player::One);
        assert_eq!(env.outcome(), Some(GameOutcome::InvalidMove(Player::One)));
    }

    #[test]
    fn test_out_of_range_action_is_rejected() {
        let mut env = Connect4::new();
        let err = env.step(7).unwrap_err();
        assert_eq!(err, EnvError::InvalidAction { action: 7, width: 7 });
        assert!(env.states().is_empty());
        assert!(!env.is_terminated());
    }

    #[test]
    fn test_step_after_termination_is_rejected() {
        let mut env = Connect4::new();
        play(&mut env, &[0, 1, 0, 1, 0, 1, 0]);
        let err = env.step(2).unwrap_err();
        assert_eq!(err, EnvError::Terminated);
        assert_eq!(env.actions().len(), 7);
    }

    #[test]
    fn test_no_outcome_while_running() {
        let mut env = Connect4::new();
        play(&mut env, &[3]);
        assert_eq!(env.outcome(), None);
    }
}
