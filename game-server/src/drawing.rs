use std::collections::HashMap;

use tokio::sync::RwLock;

use game_types::PlayerId;

/// Opaque stroke payloads captured while their owner draws, replayed to the
/// room when that owner is shown. The server never inspects the payloads.
pub struct DrawingStore {
    strokes: RwLock<HashMap<PlayerId, Vec<serde_json::Value>>>,
}

impl DrawingStore {
    pub fn new() -> Self {
        Self {
            strokes: RwLock::new(HashMap::new()),
        }
    }

    pub async fn append(&self, player: PlayerId, payload: serde_json::Value) {
        let mut strokes = self.strokes.write().await;
        strokes.entry(player).or_default().push(payload);
    }

    pub async fn clear_player(&self, player: PlayerId) {
        let mut strokes = self.strokes.write().await;
        strokes.remove(&player);
    }

    pub async fn clear_players(&self, players: &[PlayerId]) {
        let mut strokes = self.strokes.write().await;
        for player in players {
            strokes.remove(player);
        }
    }

    pub async fn strokes_for(&self, player: PlayerId) -> Vec<serde_json::Value> {
        let strokes = self.strokes.read().await;
        strokes.get(&player).cloned().unwrap_or_default()
    }
}

impl Default for DrawingStore {
    fn default() -> Self {
        Self::new()
    }
}
