pub mod board;
pub mod connection;
pub mod constants;
pub mod error;
pub mod room;
pub mod room_id;
pub mod room_registry;

pub use board::{evaluate_outcome, Board, CellIndex, Mark, Outcome};
pub use connection::{ConnectionId, ConnectionSender};
pub use constants::*;
pub use error::RoomError;
pub use room::{Room, RoomPhase};
pub use room_id::RoomId;
pub use room_registry::RoomRegistry;
