use thiserror::Error;

use super::CellIndex;

/// Reasons a room operation is rejected.
///
/// Only errors where [`RoomError::is_client_visible`] holds are reported to
/// the client; the rest are logged and the event is dropped without touching
/// room state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("Room is full or does not exist")]
    RoomFullOrMissing,

    #[error("Room not found")]
    RoomNotFound,

    #[error("Connection is not a member of this room")]
    NotAMember,

    #[error("Waiting for an opponent to join")]
    WaitingForOpponent,

    #[error("Game is over, restart to play again")]
    GameOver,

    #[error("Not your turn")]
    NotYourTurn,

    #[error("Cell {0} is already occupied")]
    CellOccupied(CellIndex),

    #[error("Cell {0} is empty")]
    CellEmpty(CellIndex),

    #[error("Only the room owner can use abilities")]
    NotOwner,
}

impl RoomError {
    /// Whether the offending connection is told about this error
    pub fn is_client_visible(&self) -> bool {
        matches!(self, RoomError::RoomFullOrMissing)
    }
}
