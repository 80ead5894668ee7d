use serde::{Deserialize, Serialize};

use crate::core::{Board, ConnectionId, Mark, Room, RoomId};

/// Board plus whose turn it is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardUpdate {
    pub board: Board,
    pub current_player: ConnectionId,
}

impl BoardUpdate {
    pub fn from_room(room: &Room) -> Self {
        Self {
            board: room.board,
            current_player: room.current_player,
        }
    }
}

/// Sent once a connection is accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    pub connection_id: ConnectionId,
}

/// Result announced when a game ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    X,
    O,
    #[serde(rename = "draw")]
    Draw,
}

impl From<Mark> for Winner {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::X => Winner::X,
            Mark::O => Winner::O,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOver {
    pub winner: Winner,
}

/// Broadcast after the owner removes a mark
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheatUpdate {
    pub board: Board,
    pub message: String,
}

/// Broadcast after the owner places an extra mark
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloneUpdate {
    pub board: Board,
    pub message: String,
    /// Owner streak after this placement (0 once the turn has passed)
    pub move_count: u8,
    pub current_player: ConnectionId,
}

/// Events the server pushes to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    Connected(ConnectionInfo),
    RoomCreated(RoomId),
    OpponentJoined,
    Error(String),
    GameStart(BoardUpdate),
    UpdateBoard(BoardUpdate),
    GameOver(GameOver),
    CheatUsed(CheatUpdate),
    CloneUsed(CloneUpdate),
    RestartGame(BoardUpdate),
    PlayerDisconnected,
    LeftRoom,
}

impl ServerEvent {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
