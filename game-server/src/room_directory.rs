use std::collections::HashMap;
use std::time::{Duration, Instant};

use rand::Rng;
use tokio::sync::RwLock;
use tracing::info;

use game_types::{Difficulty, Player, PlayerId, Room, RoomError};

const PLAYER_COLORS: [&str; 6] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7", "#DDA0DD",
];

pub const ROOM_CODE_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub enum LeaveOutcome {
    /// The player left; the returned room reflects the new roster and host.
    Departed { room: Room },
    /// The player was the last one; the room has been deleted.
    RoomClosed,
}

struct RoomEntry {
    room: Room,
    created_at: Instant,
}

/// The registry of live rooms, keyed by room code. Sessions and connections
/// reference rooms by code only; this directory is the single owner of
/// roster and host identity.
pub struct RoomDirectory {
    rooms: RwLock<HashMap<String, RoomEntry>>,
    max_players: usize,
}

impl RoomDirectory {
    pub fn new(max_players: usize) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            max_players,
        }
    }

    pub async fn create_room(
        &self,
        host_id: PlayerId,
        host_name: &str,
        difficulty: Difficulty,
        host_is_observer: bool,
    ) -> Room {
        let mut rooms = self.rooms.write().await;

        let mut rng = rand::thread_rng();
        let code = loop {
            let candidate = format!("{:06}", rng.gen_range(100_000..1_000_000));
            if !rooms.contains_key(&candidate) {
                break candidate;
            }
        };

        let room = Room {
            code: code.clone(),
            host_id,
            difficulty,
            players: vec![Player {
                id: host_id,
                name: host_name.to_string(),
                color: Self::player_color(0),
                is_host: true,
                is_observer: host_is_observer,
            }],
            in_game: false,
        };

        rooms.insert(
            code.clone(),
            RoomEntry {
                room: room.clone(),
                created_at: Instant::now(),
            },
        );

        info!("room {} created by {}", code, host_name);
        room
    }

    pub async fn join_room(
        &self,
        code: &str,
        player_id: PlayerId,
        player_name: &str,
    ) -> Result<Room, RoomError> {
        let mut rooms = self.rooms.write().await;
        let entry = rooms.get_mut(code).ok_or(RoomError::NotFound)?;

        if entry.room.in_game {
            return Err(RoomError::AlreadyStarted);
        }
        if entry.room.players.len() >= self.max_players {
            return Err(RoomError::Full {
                max: self.max_players,
            });
        }
        if entry.room.players.iter().any(|p| p.id == player_id) {
            return Err(RoomError::AlreadyJoined);
        }

        let index = entry.room.players.len();
        entry.room.players.push(Player {
            id: player_id,
            name: player_name.to_string(),
            color: Self::player_color(index),
            is_host: false,
            is_observer: false,
        });

        Ok(entry.room.clone())
    }

    pub async fn leave_room(
        &self,
        code: &str,
        player_id: PlayerId,
    ) -> Result<LeaveOutcome, RoomError> {
        let mut rooms = self.rooms.write().await;
        let entry = rooms.get_mut(code).ok_or(RoomError::NotFound)?;

        let index = entry
            .room
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(RoomError::NotFound)?;

        let was_host = entry.room.players[index].is_host;
        entry.room.players.remove(index);

        if entry.room.players.is_empty() {
            rooms.remove(code);
            info!("room {} emptied and closed", code);
            return Ok(LeaveOutcome::RoomClosed);
        }

        if was_host {
            // Earliest remaining player inherits the seat
            entry.room.players[0].is_host = true;
            entry.room.host_id = entry.room.players[0].id;
        }

        Ok(LeaveOutcome::Departed {
            room: entry.room.clone(),
        })
    }

    pub async fn get_room(&self, code: &str) -> Option<Room> {
        let rooms = self.rooms.read().await;
        rooms.get(code).map(|entry| entry.room.clone())
    }

    pub async fn set_in_game(&self, code: &str, in_game: bool) {
        let mut rooms = self.rooms.write().await;
        if let Some(entry) = rooms.get_mut(code) {
            entry.room.in_game = in_game;
        }
    }

    /// Remove rooms past their lifetime; returns the removed codes so their
    /// sessions can be torn down.
    pub async fn cleanup_expired(&self, ttl: Duration) -> Vec<String> {
        let mut rooms = self.rooms.write().await;
        let expired: Vec<String> = rooms
            .iter()
            .filter(|(_, entry)| entry.created_at.elapsed() > ttl)
            .map(|(code, _)| code.clone())
            .collect();

        for code in &expired {
            rooms.remove(code);
        }

        expired
    }

    pub async fn room_count(&self) -> usize {
        let rooms = self.rooms.read().await;
        rooms.len()
    }

    pub fn player_color(index: usize) -> String {
        PLAYER_COLORS[index % PLAYER_COLORS.len()].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_create_and_join() {
        let directory = RoomDirectory::new(6);
        let host = Uuid::new_v4();
        let room = directory
            .create_room(host, "Alice", Difficulty::Mixed, false)
            .await;

        assert_eq!(room.code.len(), ROOM_CODE_LEN);
        assert_eq!(room.host_id, host);
        assert!(room.players[0].is_host);

        let joiner = Uuid::new_v4();
        let room = directory.join_room(&room.code, joiner, "Bob").await.unwrap();
        assert_eq!(room.players.len(), 2);
        assert!(!room.players[1].is_host);
        assert_ne!(room.players[0].color, room.players[1].color);
    }

    #[tokio::test]
    async fn test_join_unknown_room() {
        let directory = RoomDirectory::new(6);
        let result = directory.join_room("000000", Uuid::new_v4(), "Bob").await;
        assert_eq!(result.unwrap_err(), RoomError::NotFound);
    }

    #[tokio::test]
    async fn test_join_rejected_once_started() {
        let directory = RoomDirectory::new(6);
        let room = directory
            .create_room(Uuid::new_v4(), "Alice", Difficulty::Easy, false)
            .await;
        directory.set_in_game(&room.code, true).await;

        let result = directory.join_room(&room.code, Uuid::new_v4(), "Late").await;
        assert_eq!(result.unwrap_err(), RoomError::AlreadyStarted);
    }

    #[tokio::test]
    async fn test_capacity_enforced() {
        let directory = RoomDirectory::new(3);
        let room = directory
            .create_room(Uuid::new_v4(), "Alice", Difficulty::Easy, false)
            .await;

        directory
            .join_room(&room.code, Uuid::new_v4(), "Bob")
            .await
            .unwrap();
        directory
            .join_room(&room.code, Uuid::new_v4(), "Carol")
            .await
            .unwrap();

        let result = directory.join_room(&room.code, Uuid::new_v4(), "Dave").await;
        assert_eq!(result.unwrap_err(), RoomError::Full { max: 3 });
    }

    #[tokio::test]
    async fn test_duplicate_join_rejected() {
        let directory = RoomDirectory::new(6);
        let host = Uuid::new_v4();
        let room = directory
            .create_room(host, "Alice", Difficulty::Easy, false)
            .await;

        let result = directory.join_room(&room.code, host, "Alice").await;
        assert_eq!(result.unwrap_err(), RoomError::AlreadyJoined);
    }

    #[tokio::test]
    async fn test_host_reassignment_on_leave() {
        let directory = RoomDirectory::new(6);
        let host = Uuid::new_v4();
        let other = Uuid::new_v4();
        let room = directory
            .create_room(host, "Alice", Difficulty::Easy, false)
            .await;
        directory.join_room(&room.code, other, "Bob").await.unwrap();

        match directory.leave_room(&room.code, host).await.unwrap() {
            LeaveOutcome::Departed { room } => {
                assert_eq!(room.host_id, other);
                assert!(room.players[0].is_host);
            }
            other => panic!("expected departure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_room_closes_when_emptied() {
        let directory = RoomDirectory::new(6);
        let host = Uuid::new_v4();
        let room = directory
            .create_room(host, "Alice", Difficulty::Easy, false)
            .await;

        let outcome = directory.leave_room(&room.code, host).await.unwrap();
        assert_eq!(outcome, LeaveOutcome::RoomClosed);
        assert!(directory.get_room(&room.code).await.is_none());
    }

    #[tokio::test]
    async fn test_cleanup_expired_rooms() {
        let directory = RoomDirectory::new(6);
        let room = directory
            .create_room(Uuid::new_v4(), "Alice", Difficulty::Easy, false)
            .await;

        assert!(directory.cleanup_expired(Duration::from_secs(60)).await.is_empty());
        let removed = directory.cleanup_expired(Duration::ZERO).await;
        assert_eq!(removed, vec![room.code.clone()]);
        assert_eq!(directory.room_count().await, 0);
    }
}
