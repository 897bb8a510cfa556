use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::game::{Difficulty, FinalRanking, RoundStanding, TargetResult};
use crate::player::{Player, PlayerId};
use crate::room::RoomInfo;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
#[ts(export)]
pub enum ClientMessage {
    CreateRoom {
        player_name: String,
        #[serde(default)]
        difficulty: Difficulty,
        #[serde(default)]
        is_observer: bool,
    },
    JoinRoom {
        room_code: String,
        player_name: String,
    },
    LeaveRoom,
    StartGame,
    Draw {
        draw_data: serde_json::Value,
    },
    ClearCanvas,
    FinishDrawing,
    SubmitGuess {
        guess_number: u8,
    },
    NextGuessing,
    NextRound,
    Chat {
        message: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
#[ts(export)]
pub enum ServerMessage {
    Connected {
        player_id: PlayerId,
    },
    RoomCreated {
        room: RoomInfo,
        player_id: PlayerId,
    },
    RoomJoined {
        room: RoomInfo,
        player_id: PlayerId,
    },
    PlayerJoined {
        player: Player,
        players: Vec<Player>,
    },
    PlayerLeft {
        player_id: PlayerId,
        players: Vec<Player>,
        new_host_id: PlayerId,
    },
    LeftRoom,
    DrawingPhaseStarted {
        round: u32,
        total_rounds: u32,
        duration: u64,
        players: Vec<Player>,
    },
    /// Unicast. The only message that ever carries a live secret assignment.
    PrivateInfo {
        words: Vec<String>,
        assigned_number: u8,
        assigned_word: String,
    },
    PlayerFinishedDrawing {
        player_id: PlayerId,
        player_name: String,
    },
    GuessingPhaseStarted {
        target_player_id: PlayerId,
        target_player_name: String,
        target_player_color: String,
        words: Vec<String>,
        guessing_index: u32,
        total_targets: u32,
        duration: u64,
        drawings: Vec<serde_json::Value>,
    },
    /// Unicast to the guesser only.
    GuessSubmitted {
        is_correct: bool,
    },
    GuessingEnded {
        target_player_id: PlayerId,
        correct_answer: u8,
        correct_word: String,
        results: Vec<TargetResult>,
        has_more_targets: bool,
    },
    RoundEnded {
        round: u32,
        results: Vec<RoundStanding>,
        is_game_end: bool,
    },
    GameEnded {
        rankings: Vec<FinalRanking>,
    },
    Chat {
        player_id: PlayerId,
        player_name: String,
        message: String,
        timestamp: i64,
    },
    Error {
        message: String,
    },
}
