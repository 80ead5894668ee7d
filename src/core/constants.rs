/// Number of cells on the board
pub const BOARD_CELLS: usize = 9;

/// Maximum number of players in a room
pub const MAX_PLAYERS: usize = 2;

/// Length of a room code
pub const ROOM_ID_LEN: usize = 6;

/// Characters a room code is drawn from (base 36, lowercase)
pub const ROOM_ID_ALPHABET: &str = "0123456789abcdefghijklmnopqrstuvwxyz";

/// Consecutive clone placements the owner gets before the turn passes
pub const CLONE_STREAK_LIMIT: u8 = 2;

/// All winning lines: rows, columns, diagonals
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];
