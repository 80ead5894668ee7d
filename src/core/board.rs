use serde::{Deserialize, Serialize};
use std::fmt;

use super::{BOARD_CELLS, WINNING_LINES};

/// A player's mark on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// Mark played by the player at `seat` in the room's player list
    pub fn for_seat(seat: usize) -> Self {
        if seat == 0 {
            Mark::X
        } else {
            Mark::O
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mark::X => "X",
            Mark::O => "O",
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated board position (0..=8, row-major)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct CellIndex(usize);

impl CellIndex {
    pub fn new(index: usize) -> Result<Self, String> {
        if index < BOARD_CELLS {
            Ok(Self(index))
        } else {
            Err(format!(
                "cell index must be between 0 and {}, got {}",
                BOARD_CELLS - 1,
                index
            ))
        }
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl TryFrom<usize> for CellIndex {
    type Error = String;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CellIndex> for usize {
    fn from(index: CellIndex) -> Self {
        index.0
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Result of evaluating a board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No line and free cells left
    Undecided,
    Won(Mark),
    Draw,
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::Undecided)
    }
}

/// The 3x3 grid. Serializes as a 9-element array of `null | "X" | "O"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board([Option<Mark>; BOARD_CELLS]);

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cells(cells: [Option<Mark>; BOARD_CELLS]) -> Self {
        Self(cells)
    }

    pub fn get(&self, index: CellIndex) -> Option<Mark> {
        self.0[index.get()]
    }

    pub fn is_empty_at(&self, index: CellIndex) -> bool {
        self.get(index).is_none()
    }

    pub fn place(&mut self, index: CellIndex, mark: Mark) {
        self.0[index.get()] = Some(mark);
    }

    pub fn clear_cell(&mut self, index: CellIndex) {
        self.0[index.get()] = None;
    }

    pub fn is_full(&self) -> bool {
        self.0.iter().all(Option::is_some)
    }

    pub fn is_blank(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }

    /// Mark holding a complete line, if any
    pub fn winner(&self) -> Option<Mark> {
        WINNING_LINES.iter().find_map(|&[a, b, c]| match self.0[a] {
            Some(mark) if self.0[b] == Some(mark) && self.0[c] == Some(mark) => Some(mark),
            _ => None,
        })
    }
}

/// Evaluate a board: a completed line wins, otherwise a full board is a draw
pub fn evaluate_outcome(board: &Board) -> Outcome {
    if let Some(mark) = board.winner() {
        Outcome::Won(mark)
    } else if board.is_full() {
        Outcome::Draw
    } else {
        Outcome::Undecided
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const X: Option<Mark> = Some(Mark::X);
    const O: Option<Mark> = Some(Mark::O);
    const E: Option<Mark> = None;

    #[test]
    fn test_empty_board_is_undecided() {
        assert_eq!(evaluate_outcome(&Board::new()), Outcome::Undecided);
    }

    #[test]
    fn test_top_row_wins_for_x() {
        let board = Board::from_cells([X, X, X, E, E, E, E, E, E]);
        assert_eq!(evaluate_outcome(&board), Outcome::Won(Mark::X));
    }

    #[test]
    fn test_every_line_is_detected() {
        for line in WINNING_LINES {
            for mark in [Mark::X, Mark::O] {
                let mut board = Board::new();
                for index in line {
                    board.place(CellIndex::new(index).unwrap(), mark);
                }
                assert_eq!(
                    evaluate_outcome(&board),
                    Outcome::Won(mark),
                    "line {:?} should win for {}",
                    line,
                    mark
                );
            }
        }
    }

    #[test]
    fn test_full_board_without_line_is_draw() {
        let board = Board::from_cells([X, O, X, X, O, O, O, X, X]);
        assert_eq!(evaluate_outcome(&board), Outcome::Draw);
    }

    #[test]
    fn test_win_on_full_board_beats_draw() {
        let board = Board::from_cells([X, X, X, O, O, X, O, X, O]);
        assert_eq!(evaluate_outcome(&board), Outcome::Won(Mark::X));
    }

    #[test]
    fn test_partial_board_is_undecided() {
        let board = Board::from_cells([X, O, E, E, X, E, E, E, O]);
        assert_eq!(evaluate_outcome(&board), Outcome::Undecided);
    }

    #[test]
    fn test_mixed_line_does_not_win() {
        let board = Board::from_cells([X, X, O, E, E, E, E, E, E]);
        assert!(board.winner().is_none());
    }

    #[test]
    fn test_cell_index_bounds() {
        assert!(CellIndex::new(0).is_ok());
        assert!(CellIndex::new(8).is_ok());
        assert!(CellIndex::new(9).is_err());
    }

    #[test]
    fn test_board_serializes_as_array() {
        let board = Board::from_cells([X, E, E, E, O, E, E, E, E]);
        let json = serde_json::to_value(board).unwrap();
        assert_eq!(
            json,
            serde_json::json!(["X", null, null, null, "O", null, null, null, null])
        );
    }

    #[test]
    fn test_cell_index_rejects_out_of_range_json() {
        assert!(serde_json::from_str::<CellIndex>("4").is_ok());
        assert!(serde_json::from_str::<CellIndex>("9").is_err());
        assert!(serde_json::from_str::<CellIndex>("-1").is_err());
    }

    #[test]
    fn test_mark_for_seat() {
        assert_eq!(Mark::for_seat(0), Mark::X);
        assert_eq!(Mark::for_seat(1), Mark::O);
    }
}
