use serde::{Deserialize, Serialize};

use crate::core::{CellIndex, RoomId};

/// Target of a move or ability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CellTarget {
    pub room_id: RoomId,
    pub index: CellIndex,
}

/// Events a client sends over the websocket.
///
/// Wire format: `{"event": "<name>", "data": <payload>}`, `data` omitted for
/// `createRoom`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    CreateRoom,
    JoinRoom(RoomId),
    StartGame(RoomId),
    MakeMove(CellTarget),
    /// Owner ability: remove any mark
    UseCheat(CellTarget),
    /// Owner ability: place an extra mark
    UseClone(CellTarget),
    RestartGame(RoomId),
    LeaveRoom(RoomId),
}

impl ClientEvent {
    /// Parse a text frame
    ///
    /// # Errors
    ///
    /// Returns a readable message for unknown events or malformed payloads
    pub fn parse(text: &str) -> Result<Self, String> {
        serde_json::from_str(text).map_err(|e| format!("Malformed message: {}", e))
    }

    /// Event name as used on the wire
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::CreateRoom => "createRoom",
            ClientEvent::JoinRoom(_) => "joinRoom",
            ClientEvent::StartGame(_) => "startGame",
            ClientEvent::MakeMove(_) => "makeMove",
            ClientEvent::UseCheat(_) => "useCheat",
            ClientEvent::UseClone(_) => "useClone",
            ClientEvent::RestartGame(_) => "restartGame",
            ClientEvent::LeaveRoom(_) => "leaveRoom",
        }
    }
}
