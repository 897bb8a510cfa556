use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::player::PlayerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum GamePhase {
    Waiting,
    Drawing,
    Guessing,
    Showing,
    Scoring,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    #[default]
    Mixed,
}

/// A player's secret assignment for the current round. Unicast only; never
/// part of a room broadcast before the owning target's reveal.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PrivateAssignment {
    pub words: Vec<String>,
    pub assigned_number: u8,
    pub assigned_word: String,
    pub has_finished_drawing: bool,
}

/// One guesser's outcome against a single shown drawing.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TargetResult {
    pub player_id: PlayerId,
    pub player_name: String,
    pub player_color: String,
    pub guess_number: Option<u8>,
    pub is_correct: bool,
    pub score: i32,
    pub rank: Option<u32>,
    pub did_not_guess: bool,
}

/// Per-player line of a round settlement, sorted by round score.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RoundStanding {
    pub player_id: PlayerId,
    pub player_name: String,
    pub player_color: String,
    pub round_score: i32,
    pub total_score: i32,
}

/// Final placement. Tied totals share a rank; the next distinct total takes
/// its list position plus one (dense competition ranking).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FinalRanking {
    pub player_id: PlayerId,
    pub player_name: String,
    pub color: String,
    pub total_score: i32,
    pub rank: u32,
}
