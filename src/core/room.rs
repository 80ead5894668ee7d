use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{
    evaluate_outcome, Board, CellIndex, ConnectionId, Mark, Outcome, RoomError, RoomId,
    CLONE_STREAK_LIMIT, MAX_PLAYERS,
};

/// Where a room is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomPhase {
    /// Owner alone, waiting for an opponent
    Open,
    /// Two players, no mark placed yet
    Ready,
    /// Marks on the board, no result yet
    Playing,
    /// A line was completed or the board filled up
    Finished,
}

/// State of a single two-player game room
#[derive(Debug, Clone)]
pub struct Room {
    /// Room code players use to join
    pub id: RoomId,
    /// Seat order: index 0 plays X, index 1 plays O
    pub players: Vec<ConnectionId>,
    pub board: Board,
    /// Connection whose turn it is
    pub current_player: ConnectionId,
    /// Creator of the room, the only one allowed to use abilities
    pub owner: ConnectionId,
    /// Consecutive clone placements by the owner in the current turn
    pub owner_streak: u8,
    /// Last evaluated result
    pub outcome: Outcome,
}

impl Room {
    /// Create a room with `owner` as its only player, holding the first turn
    pub fn new(id: RoomId, owner: ConnectionId) -> Self {
        Self {
            id,
            players: vec![owner],
            board: Board::new(),
            current_player: owner,
            owner,
            owner_streak: 0,
            outcome: Outcome::Undecided,
        }
    }

    pub fn phase(&self) -> RoomPhase {
        if self.outcome.is_terminal() {
            RoomPhase::Finished
        } else if self.players.len() < MAX_PLAYERS {
            RoomPhase::Open
        } else if self.board.is_blank() {
            RoomPhase::Ready
        } else {
            RoomPhase::Playing
        }
    }

    pub fn contains(&self, conn: ConnectionId) -> bool {
        self.players.contains(&conn)
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    /// Mark played by `conn`, based on its seat
    pub fn mark_of(&self, conn: ConnectionId) -> Option<Mark> {
        self.players
            .iter()
            .position(|&p| p == conn)
            .map(Mark::for_seat)
    }

    /// The other player in the room, if present
    pub fn opponent_of(&self, conn: ConnectionId) -> Option<ConnectionId> {
        self.players.iter().copied().find(|&p| p != conn)
    }

    /// Seat a second player
    ///
    /// # Errors
    ///
    /// Returns `RoomFullOrMissing` if both seats are taken
    pub fn add_player(&mut self, conn: ConnectionId) -> Result<(), RoomError> {
        if self.is_full() || self.contains(conn) {
            return Err(RoomError::RoomFullOrMissing);
        }
        self.players.push(conn);
        Ok(())
    }

    /// Remove a player. The remaining player, if any, moves to seat 0 and
    /// holds the turn, and the board is cleared for the next opponent.
    /// Ownership stays with the creator, who regains the abilities on rejoin.
    ///
    /// # Returns
    ///
    /// True if `conn` was seated in this room
    pub fn remove_player(&mut self, conn: ConnectionId) -> bool {
        let before = self.players.len();
        self.players.retain(|&p| p != conn);
        if self.players.len() == before {
            return false;
        }

        if let Some(&remaining) = self.players.first() {
            self.current_player = remaining;
            self.board = Board::new();
            self.owner_streak = 0;
            self.outcome = Outcome::Undecided;
        }
        true
    }

    /// Reject anyone who is not seated here
    pub fn ensure_member(&self, conn: ConnectionId) -> Result<(), RoomError> {
        if self.contains(conn) {
            Ok(())
        } else {
            Err(RoomError::NotAMember)
        }
    }

    fn ensure_not_finished(&self) -> Result<(), RoomError> {
        if self.outcome.is_terminal() {
            Err(RoomError::GameOver)
        } else {
            Ok(())
        }
    }

    /// Place the caller's mark on their turn and hand the turn over
    ///
    /// # Errors
    ///
    /// Rejected after game over, without an opponent, out of turn, or on an
    /// occupied cell
    pub fn make_move(
        &mut self,
        conn: ConnectionId,
        index: CellIndex,
    ) -> Result<Outcome, RoomError> {
        self.ensure_not_finished()?;
        if !self.is_full() {
            return Err(RoomError::WaitingForOpponent);
        }
        if self.current_player != conn {
            return Err(RoomError::NotYourTurn);
        }
        if !self.board.is_empty_at(index) {
            return Err(RoomError::CellOccupied(index));
        }
        let mark = self.mark_of(conn).ok_or(RoomError::NotAMember)?;
        let opponent = self.opponent_of(conn).ok_or(RoomError::WaitingForOpponent)?;

        self.board.place(index, mark);
        self.current_player = opponent;
        self.owner_streak = 0;
        self.outcome = evaluate_outcome(&self.board);
        Ok(self.outcome)
    }

    /// Owner ability: wipe any occupied cell.
    ///
    /// Only a winner is re-checked afterwards; clearing a cell can never
    /// produce a full board.
    pub fn remove_mark(
        &mut self,
        conn: ConnectionId,
        index: CellIndex,
    ) -> Result<Outcome, RoomError> {
        self.ensure_not_finished()?;
        self.ensure_member(conn)?;
        if self.owner != conn {
            return Err(RoomError::NotOwner);
        }
        if self.board.is_empty_at(index) {
            return Err(RoomError::CellEmpty(index));
        }

        self.board.clear_cell(index);
        self.outcome = match self.board.winner() {
            Some(mark) => Outcome::Won(mark),
            None => Outcome::Undecided,
        };
        Ok(self.outcome)
    }

    /// Owner ability: place an extra mark without ending the turn. The turn
    /// passes to the opponent once the streak reaches the limit.
    pub fn clone_mark(
        &mut self,
        conn: ConnectionId,
        index: CellIndex,
    ) -> Result<Outcome, RoomError> {
        self.ensure_not_finished()?;
        self.ensure_member(conn)?;
        if self.owner != conn {
            return Err(RoomError::NotOwner);
        }
        let opponent = self.opponent_of(conn).ok_or(RoomError::WaitingForOpponent)?;
        if !self.board.is_empty_at(index) {
            return Err(RoomError::CellOccupied(index));
        }
        let mark = self.mark_of(conn).ok_or(RoomError::NotAMember)?;

        self.board.place(index, mark);
        self.owner_streak += 1;
        if self.owner_streak >= CLONE_STREAK_LIMIT {
            self.owner_streak = 0;
            self.current_player = opponent;
        }
        self.outcome = evaluate_outcome(&self.board);
        Ok(self.outcome)
    }

    /// Clear the board and draw the starting player at random
    pub fn restart<R: Rng + ?Sized>(
        &mut self,
        conn: ConnectionId,
        rng: &mut R,
    ) -> Result<(), RoomError> {
        self.ensure_member(conn)?;

        self.board = Board::new();
        if let Some(&first) = self.players.choose(rng) {
            self.current_player = first;
        }
        self.owner_streak = 0;
        self.outcome = Outcome::Undecided;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(index: usize) -> CellIndex {
        CellIndex::new(index).unwrap()
    }

    fn two_player_room() -> (Room, ConnectionId, ConnectionId) {
        let owner = ConnectionId::new();
        let guest = ConnectionId::new();
        let mut room = Room::new(RoomId::parse("abc123").unwrap(), owner);
        room.add_player(guest).unwrap();
        (room, owner, guest)
    }

    #[test]
    fn test_new_room() {
        let owner = ConnectionId::new();
        let room = Room::new(RoomId::parse("abc123").unwrap(), owner);

        assert_eq!(room.players, vec![owner]);
        assert_eq!(room.owner, owner);
        assert_eq!(room.current_player, owner);
        assert!(room.board.is_blank());
        assert_eq!(room.owner_streak, 0);
        assert_eq!(room.phase(), RoomPhase::Open);
    }

    #[test]
    fn test_add_player_and_full_room() {
        let (mut room, _, _) = two_player_room();
        assert_eq!(room.phase(), RoomPhase::Ready);

        let third = ConnectionId::new();
        assert_eq!(room.add_player(third), Err(RoomError::RoomFullOrMissing));
        assert_eq!(room.players.len(), 2);
    }

    #[test]
    fn test_marks_follow_seats() {
        let (room, owner, guest) = two_player_room();
        assert_eq!(room.mark_of(owner), Some(Mark::X));
        assert_eq!(room.mark_of(guest), Some(Mark::O));
        assert_eq!(room.mark_of(ConnectionId::new()), None);
    }

    #[test]
    fn test_legal_move_passes_turn() {
        let (mut room, owner, guest) = two_player_room();

        let outcome = room.make_move(owner, cell(4)).unwrap();
        assert_eq!(outcome, Outcome::Undecided);
        assert_eq!(room.board.get(cell(4)), Some(Mark::X));
        assert_eq!(room.current_player, guest);
        assert_eq!(room.phase(), RoomPhase::Playing);

        room.make_move(guest, cell(0)).unwrap();
        assert_eq!(room.board.get(cell(0)), Some(Mark::O));
        assert_eq!(room.current_player, owner);
    }

    #[test]
    fn test_move_out_of_turn_rejected() {
        let (mut room, _, guest) = two_player_room();
        let before = room.board;

        assert_eq!(room.make_move(guest, cell(0)), Err(RoomError::NotYourTurn));
        assert_eq!(room.board, before);
    }

    #[test]
    fn test_move_on_occupied_cell_rejected() {
        let (mut room, owner, guest) = two_player_room();
        room.make_move(owner, cell(0)).unwrap();

        assert_eq!(
            room.make_move(guest, cell(0)),
            Err(RoomError::CellOccupied(cell(0)))
        );
        assert_eq!(room.current_player, guest);
    }

    #[test]
    fn test_move_without_opponent_rejected() {
        let owner = ConnectionId::new();
        let mut room = Room::new(RoomId::parse("abc123").unwrap(), owner);

        assert_eq!(
            room.make_move(owner, cell(0)),
            Err(RoomError::WaitingForOpponent)
        );
    }

    #[test]
    fn test_winning_move_finishes_game() {
        let (mut room, owner, guest) = two_player_room();
        room.make_move(owner, cell(0)).unwrap();
        room.make_move(guest, cell(3)).unwrap();
        room.make_move(owner, cell(1)).unwrap();
        room.make_move(guest, cell(4)).unwrap();
        let outcome = room.make_move(owner, cell(2)).unwrap();

        assert_eq!(outcome, Outcome::Won(Mark::X));
        assert_eq!(room.phase(), RoomPhase::Finished);
        assert_eq!(room.make_move(guest, cell(5)), Err(RoomError::GameOver));
    }

    #[test]
    fn test_move_resets_owner_streak() {
        let (mut room, owner, _) = two_player_room();
        room.clone_mark(owner, cell(0)).unwrap();
        assert_eq!(room.owner_streak, 1);

        room.make_move(owner, cell(8)).unwrap();
        assert_eq!(room.owner_streak, 0);
    }

    #[test]
    fn test_remove_mark_clears_cell() {
        let (mut room, owner, guest) = two_player_room();
        room.make_move(owner, cell(0)).unwrap();
        room.make_move(guest, cell(4)).unwrap();

        let outcome = room.remove_mark(owner, cell(4)).unwrap();
        assert_eq!(outcome, Outcome::Undecided);
        assert!(room.board.is_empty_at(cell(4)));
    }

    #[test]
    fn test_remove_mark_on_empty_cell_rejected() {
        let (mut room, owner, _) = two_player_room();
        assert_eq!(
            room.remove_mark(owner, cell(4)),
            Err(RoomError::CellEmpty(cell(4)))
        );
    }

    #[test]
    fn test_abilities_are_owner_only() {
        let (mut room, owner, guest) = two_player_room();
        room.make_move(owner, cell(0)).unwrap();

        assert_eq!(room.remove_mark(guest, cell(0)), Err(RoomError::NotOwner));
        assert_eq!(room.clone_mark(guest, cell(1)), Err(RoomError::NotOwner));
        assert_eq!(room.board.get(cell(0)), Some(Mark::X));
        assert!(room.board.is_empty_at(cell(1)));
    }

    #[test]
    fn test_single_clone_keeps_turn() {
        let (mut room, owner, _) = two_player_room();

        room.clone_mark(owner, cell(0)).unwrap();
        assert_eq!(room.owner_streak, 1);
        assert_eq!(room.current_player, owner);
        assert_eq!(room.board.get(cell(0)), Some(Mark::X));
    }

    #[test]
    fn test_second_clone_passes_turn() {
        let (mut room, owner, guest) = two_player_room();

        room.clone_mark(owner, cell(0)).unwrap();
        room.clone_mark(owner, cell(8)).unwrap();
        assert_eq!(room.owner_streak, 0);
        assert_eq!(room.current_player, guest);
    }

    #[test]
    fn test_clone_can_win() {
        let (mut room, owner, guest) = two_player_room();
        room.make_move(owner, cell(0)).unwrap();
        room.make_move(guest, cell(3)).unwrap();

        room.clone_mark(owner, cell(1)).unwrap();
        let outcome = room.clone_mark(owner, cell(2)).unwrap();
        assert_eq!(outcome, Outcome::Won(Mark::X));
    }

    #[test]
    fn test_clone_on_occupied_cell_rejected() {
        let (mut room, owner, _) = two_player_room();
        room.make_move(owner, cell(0)).unwrap();

        assert_eq!(
            room.clone_mark(owner, cell(0)),
            Err(RoomError::CellOccupied(cell(0)))
        );
        assert_eq!(room.owner_streak, 0);
    }

    #[test]
    fn test_restart_clears_board_and_picks_member() {
        let (mut room, owner, guest) = two_player_room();
        room.make_move(owner, cell(0)).unwrap();
        room.clone_mark(owner, cell(1)).unwrap();

        let mut rng = rand::thread_rng();
        room.restart(guest, &mut rng).unwrap();

        assert!(room.board.is_blank());
        assert!(room.players.contains(&room.current_player));
        assert_eq!(room.owner_streak, 0);
        assert_eq!(room.outcome, Outcome::Undecided);
    }

    #[test]
    fn test_restart_by_outsider_rejected() {
        let (mut room, _, _) = two_player_room();
        let mut rng = rand::thread_rng();
        assert_eq!(
            room.restart(ConnectionId::new(), &mut rng),
            Err(RoomError::NotAMember)
        );
    }

    #[test]
    fn test_creator_leaving_resets_room() {
        let (mut room, owner, guest) = two_player_room();
        room.make_move(owner, cell(0)).unwrap();

        assert!(room.remove_player(owner));
        assert_eq!(room.players, vec![guest]);
        assert_eq!(room.owner, owner);
        assert_eq!(room.current_player, guest);
        assert_eq!(room.mark_of(guest), Some(Mark::X));
        assert!(room.board.is_blank());
        assert_eq!(room.phase(), RoomPhase::Open);
    }

    #[test]
    fn test_ownership_stays_with_creator() {
        let (mut room, owner, guest) = two_player_room();
        room.remove_player(owner);
        let newcomer = ConnectionId::new();
        room.add_player(newcomer).unwrap();
        room.make_move(guest, cell(0)).unwrap();

        // the remaining guest does not inherit the abilities
        assert_eq!(room.clone_mark(guest, cell(1)), Err(RoomError::NotOwner));
        assert_eq!(room.remove_mark(guest, cell(0)), Err(RoomError::NotOwner));
        // nor can the departed creator act on the room
        assert_eq!(room.remove_mark(owner, cell(0)), Err(RoomError::NotAMember));
        assert_eq!(room.clone_mark(owner, cell(1)), Err(RoomError::NotAMember));
        assert_eq!(room.board.get(cell(0)), Some(Mark::X));
    }

    #[test]
    fn test_creator_rejoining_regains_abilities() {
        let (mut room, owner, guest) = two_player_room();
        room.remove_player(owner);
        room.add_player(owner).unwrap();
        room.make_move(guest, cell(0)).unwrap();

        assert_eq!(room.mark_of(owner), Some(Mark::O));
        assert!(room.remove_mark(owner, cell(0)).is_ok());
        assert!(room.board.is_empty_at(cell(0)));
    }

    #[test]
    fn test_remove_unknown_player() {
        let (mut room, _, _) = two_player_room();
        assert!(!room.remove_player(ConnectionId::new()));
        assert_eq!(room.players.len(), 2);
    }
}
