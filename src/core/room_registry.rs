use std::collections::HashMap;

use super::{
    CellIndex, ConnectionId, ConnectionSender, Outcome, Room, RoomError, RoomId, RoomPhase,
};
use crate::models::{
    BoardUpdate, CheatUpdate, ClientEvent, CloneUpdate, ConnectionInfo, GameOver, ServerEvent,
    Winner,
};

/// Owner of every live room and of each connection's outbound channel.
///
/// Callers hold the registry behind a single write lock while handling an
/// event, so each mutation and the broadcasts that follow it are applied in
/// one step and every member sees updates in the same order.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    /// Map of room_id to Room
    rooms: HashMap<RoomId, Room>,
    /// Outbound channel per connected client
    connections: HashMap<ConnectionId, ConnectionSender>,
}

impl RoomRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
            connections: HashMap::new(),
        }
    }

    /// Register a new connection and tell it its id
    pub fn connect(&mut self, conn: ConnectionId, sender: ConnectionSender) {
        self.connections.insert(conn, sender);
        self.send_to(
            conn,
            ServerEvent::Connected(ConnectionInfo {
                connection_id: conn,
            }),
        );
        tracing::debug!("Connection registered: {}", conn);
    }

    /// Retrieve a room by id
    pub fn get_room(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Ids of every room `conn` is seated in
    pub fn rooms_of(&self, conn: ConnectionId) -> Vec<RoomId> {
        self.rooms
            .values()
            .filter(|room| room.contains(conn))
            .map(|room| room.id.clone())
            .collect()
    }

    /// Route a parsed client event to its handler
    ///
    /// Client-visible rejections are sent back to `conn` as an `error` event
    /// before being returned.
    ///
    /// # Errors
    ///
    /// Returns the rejection reason
    pub fn handle_event(
        &mut self,
        conn: ConnectionId,
        event: ClientEvent,
    ) -> Result<(), RoomError> {
        let result = self.dispatch(conn, event);
        if let Err(err) = &result {
            if err.is_client_visible() {
                self.send_to(conn, ServerEvent::Error(err.to_string()));
            }
        }
        result
    }

    fn dispatch(&mut self, conn: ConnectionId, event: ClientEvent) -> Result<(), RoomError> {
        match event {
            ClientEvent::CreateRoom => {
                self.create_room(conn);
                Ok(())
            }
            ClientEvent::JoinRoom(room_id) => self.join_room(conn, &room_id),
            ClientEvent::StartGame(room_id) => self.start_game(conn, &room_id),
            ClientEvent::MakeMove(target) => self
                .make_move(conn, &target.room_id, target.index)
                .map(|_| ()),
            ClientEvent::UseCheat(target) => self
                .use_remove_ability(conn, &target.room_id, target.index)
                .map(|_| ()),
            ClientEvent::UseClone(target) => self
                .use_clone_ability(conn, &target.room_id, target.index)
                .map(|_| ()),
            ClientEvent::RestartGame(room_id) => self.restart_game(conn, &room_id),
            ClientEvent::LeaveRoom(room_id) => self.leave_room(conn, &room_id),
        }
    }

    /// Create a room owned by `conn` under a fresh code
    ///
    /// # Returns
    ///
    /// The new room's id, also sent to the caller as `roomCreated`
    pub fn create_room(&mut self, conn: ConnectionId) -> RoomId {
        let mut rng = rand::thread_rng();
        let mut room_id = RoomId::random(&mut rng);

        // 36^6 codes, collisions are rare but possible
        while self.rooms.contains_key(&room_id) {
            room_id = RoomId::random(&mut rng);
        }

        self.rooms
            .insert(room_id.clone(), Room::new(room_id.clone(), conn));
        tracing::info!("Room {} created by {}", room_id, conn);

        self.send_to(conn, ServerEvent::RoomCreated(room_id.clone()));
        room_id
    }

    /// Seat `conn` as the second player
    ///
    /// # Errors
    ///
    /// `RoomFullOrMissing` if the room does not exist or both seats are taken
    pub fn join_room(&mut self, conn: ConnectionId, room_id: &RoomId) -> Result<(), RoomError> {
        self.rooms
            .get_mut(room_id)
            .ok_or(RoomError::RoomFullOrMissing)?
            .add_player(conn)?;

        tracing::info!("{} joined room {}", conn, room_id);
        self.broadcast(room_id, ServerEvent::OpponentJoined);
        Ok(())
    }

    /// Announce the current board and turn to the whole room
    pub fn start_game(&mut self, conn: ConnectionId, room_id: &RoomId) -> Result<(), RoomError> {
        let room = self.rooms.get(room_id).ok_or(RoomError::RoomNotFound)?;
        room.ensure_member(conn)?;

        let update = BoardUpdate::from_room(room);
        self.broadcast(room_id, ServerEvent::GameStart(update));
        Ok(())
    }

    /// Regular turn move
    pub fn make_move(
        &mut self,
        conn: ConnectionId,
        room_id: &RoomId,
        index: CellIndex,
    ) -> Result<Outcome, RoomError> {
        let room = self.rooms.get_mut(room_id).ok_or(RoomError::RoomNotFound)?;
        let outcome = room.make_move(conn, index)?;

        let update = BoardUpdate::from_room(room);
        self.broadcast(room_id, ServerEvent::UpdateBoard(update));
        self.announce_outcome(room_id, outcome);
        Ok(outcome)
    }

    /// Owner ability: clear an occupied cell
    pub fn use_remove_ability(
        &mut self,
        conn: ConnectionId,
        room_id: &RoomId,
        index: CellIndex,
    ) -> Result<Outcome, RoomError> {
        let room = self.rooms.get_mut(room_id).ok_or(RoomError::RoomNotFound)?;
        let outcome = room.remove_mark(conn, index)?;

        let update = CheatUpdate {
            board: room.board,
            message: format!("The room owner erased the mark on cell {}", index),
        };
        tracing::info!("Owner of room {} removed cell {}", room_id, index);
        self.broadcast(room_id, ServerEvent::CheatUsed(update));
        self.announce_outcome(room_id, outcome);
        Ok(outcome)
    }

    /// Owner ability: place an extra mark
    pub fn use_clone_ability(
        &mut self,
        conn: ConnectionId,
        room_id: &RoomId,
        index: CellIndex,
    ) -> Result<Outcome, RoomError> {
        let room = self.rooms.get_mut(room_id).ok_or(RoomError::RoomNotFound)?;
        let outcome = room.clone_mark(conn, index)?;

        let update = CloneUpdate {
            board: room.board,
            message: format!("The room owner placed an extra mark on cell {}", index),
            move_count: room.owner_streak,
            current_player: room.current_player,
        };
        tracing::info!(
            "Owner of room {} cloned onto cell {} (streak {})",
            room_id,
            index,
            room.owner_streak
        );
        self.broadcast(room_id, ServerEvent::CloneUsed(update));
        self.announce_outcome(room_id, outcome);
        Ok(outcome)
    }

    /// Clear the board and pick a random starting player
    pub fn restart_game(&mut self, conn: ConnectionId, room_id: &RoomId) -> Result<(), RoomError> {
        let room = self.rooms.get_mut(room_id).ok_or(RoomError::RoomNotFound)?;
        room.restart(conn, &mut rand::thread_rng())?;

        let update = BoardUpdate::from_room(room);
        tracing::info!("Room {} restarted, {} starts", room_id, update.current_player);
        self.broadcast(room_id, ServerEvent::RestartGame(update));
        Ok(())
    }

    /// Explicit leave. The room survives while someone is still seated; the
    /// caller is always acknowledged with `leftRoom`.
    pub fn leave_room(&mut self, conn: ConnectionId, room_id: &RoomId) -> Result<(), RoomError> {
        let result = match self.rooms.get_mut(room_id) {
            None => Err(RoomError::RoomNotFound),
            Some(room) => {
                if room.remove_player(conn) {
                    Ok(room.players.is_empty())
                } else {
                    Err(RoomError::NotAMember)
                }
            }
        };

        let outcome = match result {
            Ok(now_empty) => {
                tracing::info!("{} left room {}", conn, room_id);
                self.broadcast(room_id, ServerEvent::PlayerDisconnected);
                if now_empty {
                    self.remove_room(room_id);
                }
                Ok(())
            }
            Err(err) => Err(err),
        };

        self.send_to(conn, ServerEvent::LeftRoom);
        outcome
    }

    /// Transport-level disconnect. Every room the connection sat in is
    /// closed, even if the other player is still connected.
    ///
    /// # Returns
    ///
    /// Number of rooms closed
    pub fn disconnect(&mut self, conn: ConnectionId) -> usize {
        self.connections.remove(&conn);

        let room_ids = self.rooms_of(conn);
        for room_id in &room_ids {
            self.broadcast(room_id, ServerEvent::PlayerDisconnected);
            self.remove_room(room_id);
        }

        tracing::debug!(
            "Connection {} disconnected, closed {} room(s)",
            conn,
            room_ids.len()
        );
        room_ids.len()
    }

    /// Push an event to a single connection
    pub fn send_to(&self, conn: ConnectionId, event: ServerEvent) {
        if let Some(sender) = self.connections.get(&conn) {
            // Receiver is gone once the socket task exits
            if sender.send(event).is_err() {
                tracing::debug!("Dropped event for closed connection {}", conn);
            }
        }
    }

    /// Push an event to every player seated in the room
    fn broadcast(&self, room_id: &RoomId, event: ServerEvent) {
        let Some(room) = self.rooms.get(room_id) else {
            return;
        };

        for &player in &room.players {
            self.send_to(player, event.clone());
        }
    }

    fn announce_outcome(&self, room_id: &RoomId, outcome: Outcome) {
        let winner = match outcome {
            Outcome::Undecided => return,
            Outcome::Won(mark) => Winner::from(mark),
            Outcome::Draw => Winner::Draw,
        };

        tracing::info!("Game over in room {}: {:?}", room_id, winner);
        self.broadcast(room_id, ServerEvent::GameOver(GameOver { winner }));
    }

    fn remove_room(&mut self, room_id: &RoomId) {
        if self.rooms.remove(room_id).is_some() {
            tracing::info!("Room {} closed", room_id);
        }
    }

    /// Get statistics about rooms and connections
    ///
    /// # Returns
    ///
    /// JSON value with registry statistics
    pub fn get_stats(&self) -> serde_json::Value {
        let count_phase = |phase: RoomPhase| {
            self.rooms
                .values()
                .filter(|room| room.phase() == phase)
                .count()
        };
        let total_players: usize = self.rooms.values().map(|room| room.players.len()).sum();

        serde_json::json!({
            "total_rooms": self.rooms.len(),
            "open_rooms": count_phase(RoomPhase::Open),
            "ready_rooms": count_phase(RoomPhase::Ready),
            "active_games": count_phase(RoomPhase::Playing),
            "finished_games": count_phase(RoomPhase::Finished),
            "total_players": total_players,
            "connected_clients": self.connections.len(),
        })
    }
}
