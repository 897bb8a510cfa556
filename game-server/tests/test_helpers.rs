use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use game_core::{SessionSettings, WordCatalog};
use game_server::drawing::DrawingStore;
use game_server::game_manager::GameManager;
use game_server::room_directory::RoomDirectory;
use game_server::websocket::ConnectionManager;
use game_server::websocket::connection::ConnectionId;
use game_types::{Difficulty, PlayerId, ServerMessage};

/// Predictable prompt lists so assertions can name words.
pub struct TestCatalog;

impl WordCatalog for TestCatalog {
    fn draw(&self, count: usize, _difficulty: Difficulty) -> Vec<String> {
        (1..=count).map(|i| format!("word{i}")).collect()
    }
}

pub struct TestRig {
    pub connections: Arc<ConnectionManager>,
    pub rooms: Arc<RoomDirectory>,
    pub drawings: Arc<DrawingStore>,
    pub manager: Arc<GameManager>,
}

impl TestRig {
    pub fn new(settings: SessionSettings) -> Self {
        let connections = Arc::new(ConnectionManager::new());
        let rooms = Arc::new(RoomDirectory::new(6));
        let drawings = Arc::new(DrawingStore::new());
        let catalog: Arc<dyn WordCatalog> = Arc::new(TestCatalog);
        let manager = Arc::new(GameManager::new(
            rooms.clone(),
            connections.clone(),
            drawings.clone(),
            catalog,
            settings,
        ));

        Self {
            connections,
            rooms,
            drawings,
            manager,
        }
    }

    /// Create a room with the named players (first one hosts), each wired to
    /// a live connection so broadcasts can be observed.
    pub async fn setup_room(&self, names: &[&str]) -> (String, Vec<TestPlayer>) {
        let mut players = Vec::new();

        let host_conn = ConnectionId::new();
        let host_rx = self.connections.create_connection(host_conn).await;
        let room = self
            .rooms
            .create_room(host_conn.player_id(), names[0], Difficulty::Mixed, false)
            .await;
        self.connections
            .set_room(host_conn, Some(room.code.clone()))
            .await;
        players.push(TestPlayer {
            id: host_conn.player_id(),
            rx: host_rx,
        });

        for name in &names[1..] {
            let conn = ConnectionId::new();
            let rx = self.connections.create_connection(conn).await;
            self.rooms
                .join_room(&room.code, conn.player_id(), name)
                .await
                .unwrap();
            self.connections
                .set_room(conn, Some(room.code.clone()))
                .await;
            players.push(TestPlayer {
                id: conn.player_id(),
                rx,
            });
        }

        (room.code, players)
    }
}

pub struct TestPlayer {
    pub id: PlayerId,
    pub rx: mpsc::UnboundedReceiver<ServerMessage>,
}

impl TestPlayer {
    /// Receive messages until one matches, failing the test after a bounded
    /// wait.
    pub async fn next_matching<F>(&mut self, pred: F) -> ServerMessage
    where
        F: Fn(&ServerMessage) -> bool,
    {
        loop {
            let message = tokio::time::timeout(Duration::from_secs(15), self.rx.recv())
                .await
                .expect("timed out waiting for a matching message")
                .expect("connection channel closed");
            if pred(&message) {
                return message;
            }
        }
    }

    /// Drain everything currently queued, returning matches.
    pub fn drain_matching<F>(&mut self, pred: F) -> Vec<ServerMessage>
    where
        F: Fn(&ServerMessage) -> bool,
    {
        let mut matches = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            if pred(&message) {
                matches.push(message);
            }
        }
        matches
    }
}
