use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::game::Difficulty;
use crate::player::{Player, PlayerId};

/// A room as held by the directory. `in_game` locks out joins once the
/// session has left the waiting phase.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub code: String,
    pub host_id: PlayerId,
    pub difficulty: Difficulty,
    pub players: Vec<Player>,
    pub in_game: bool,
}

impl Room {
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn active_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_active())
    }
}

/// The shareable view of a room sent over the wire.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RoomInfo {
    pub code: String,
    pub host_id: PlayerId,
    pub difficulty: Difficulty,
    pub players: Vec<Player>,
}

impl From<&Room> for RoomInfo {
    fn from(room: &Room) -> Self {
        RoomInfo {
            code: room.code.clone(),
            host_id: room.host_id,
            difficulty: room.difficulty,
            players: room.players.clone(),
        }
    }
}
