pub mod requests;
pub mod responses;

pub use requests::{CellTarget, ClientEvent};
pub use responses::{
    BoardUpdate, CheatUpdate, CloneUpdate, ConnectionInfo, GameOver, ServerEvent, Winner,
};
