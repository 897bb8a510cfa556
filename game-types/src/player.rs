use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

pub type PlayerId = Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: String,
    pub is_host: bool,
    pub is_observer: bool,
}

impl Player {
    /// Observers never draw, guess, or score; they only watch.
    pub fn is_active(&self) -> bool {
        !self.is_observer
    }
}
