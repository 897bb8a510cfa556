use std::sync::Arc;

use tracing::info;

use game_types::{ClientMessage, GamePhase, RoomError, RoomInfo, ServerMessage};

use crate::drawing::DrawingStore;
use crate::game_manager::{GameManager, SessionCommand};
use crate::room_directory::{LeaveOutcome, ROOM_CODE_LEN, RoomDirectory};
use crate::websocket::connection::{ConnectionId, ConnectionManager};

#[derive(Clone)]
pub struct MessageHandler {
    connection_id: ConnectionId,
    connections: Arc<ConnectionManager>,
    rooms: Arc<RoomDirectory>,
    game_manager: Arc<GameManager>,
    drawings: Arc<DrawingStore>,
}

impl MessageHandler {
    pub fn new(
        connection_id: ConnectionId,
        connections: Arc<ConnectionManager>,
        rooms: Arc<RoomDirectory>,
        game_manager: Arc<GameManager>,
        drawings: Arc<DrawingStore>,
    ) -> Self {
        Self {
            connection_id,
            connections,
            rooms,
            game_manager,
            drawings,
        }
    }

    pub async fn handle_message(&self, message: ClientMessage) -> Result<(), String> {
        self.connections.update_activity(self.connection_id).await;

        match message {
            ClientMessage::CreateRoom {
                player_name,
                difficulty,
                is_observer,
            } => {
                self.handle_create_room(player_name, difficulty, is_observer)
                    .await
            }
            ClientMessage::JoinRoom {
                room_code,
                player_name,
            } => self.handle_join_room(room_code, player_name).await,
            ClientMessage::LeaveRoom => self.handle_leave_room().await,
            ClientMessage::StartGame => self.handle_start_game().await,
            ClientMessage::Draw { draw_data } => self.handle_draw(draw_data).await,
            ClientMessage::ClearCanvas => self.handle_clear_canvas().await,
            ClientMessage::FinishDrawing => {
                self.forward(|player| SessionCommand::FinishDrawing { player })
                    .await
            }
            ClientMessage::SubmitGuess { guess_number } => {
                self.forward(|player| SessionCommand::SubmitGuess {
                    player,
                    number: guess_number,
                })
                .await
            }
            ClientMessage::NextGuessing => {
                self.forward(|issuer| SessionCommand::NextGuessing { issuer })
                    .await
            }
            ClientMessage::NextRound => {
                self.forward(|issuer| SessionCommand::NextRound { issuer })
                    .await
            }
            ClientMessage::Chat { message } => self.handle_chat(message).await,
        }
    }

    pub async fn handle_disconnect(&self) {
        info!("Handling disconnect for connection {}", self.connection_id);
        self.drawings
            .clear_player(self.connection_id.player_id())
            .await;
        let _ = self.leave_current_room(false).await;
    }

    async fn handle_create_room(
        &self,
        player_name: String,
        difficulty: game_types::Difficulty,
        is_observer: bool,
    ) -> Result<(), String> {
        let name = player_name.trim();
        if name.is_empty() {
            return self.send_error(&RoomError::NameRequired.to_string()).await;
        }
        if self.current_room().await.is_some() {
            return self.send_error(&RoomError::AlreadyJoined.to_string()).await;
        }

        let player_id = self.connection_id.player_id();
        let room = self
            .rooms
            .create_room(player_id, name, difficulty, is_observer)
            .await;

        self.connections
            .set_room(self.connection_id, Some(room.code.clone()))
            .await;
        self.connections
            .set_name(self.connection_id, Some(name.to_string()))
            .await;

        self.send_message(ServerMessage::RoomCreated {
            room: RoomInfo::from(&room),
            player_id,
        })
        .await
    }

    async fn handle_join_room(&self, room_code: String, player_name: String) -> Result<(), String> {
        let name = player_name.trim();
        if name.is_empty() {
            return self.send_error(&RoomError::NameRequired.to_string()).await;
        }
        let code = room_code.trim();
        if code.len() != ROOM_CODE_LEN {
            return self.send_error(&RoomError::InvalidCode.to_string()).await;
        }
        if self.current_room().await.is_some() {
            return self.send_error(&RoomError::AlreadyJoined.to_string()).await;
        }

        let player_id = self.connection_id.player_id();
        let room = match self.rooms.join_room(code, player_id, name).await {
            Ok(room) => room,
            Err(error) => return self.send_error(&error.to_string()).await,
        };

        self.connections
            .set_room(self.connection_id, Some(code.to_string()))
            .await;
        self.connections
            .set_name(self.connection_id, Some(name.to_string()))
            .await;

        self.send_message(ServerMessage::RoomJoined {
            room: RoomInfo::from(&room),
            player_id,
        })
        .await?;

        if let Some(player) = room.player(player_id).cloned() {
            self.connections
                .broadcast_to_room(
                    code,
                    ServerMessage::PlayerJoined {
                        player,
                        players: room.players.clone(),
                    },
                    Some(self.connection_id),
                )
                .await;
        }

        Ok(())
    }

    async fn handle_leave_room(&self) -> Result<(), String> {
        self.leave_current_room(true).await
    }

    async fn handle_start_game(&self) -> Result<(), String> {
        let Some(code) = self.current_room().await else {
            return self.send_error(&RoomError::NotFound.to_string()).await;
        };

        match self
            .game_manager
            .start_game(&code, self.connection_id.player_id())
            .await
        {
            Ok(()) => Ok(()),
            Err(error) => self.send_error(&error).await,
        }
    }

    async fn handle_draw(&self, draw_data: serde_json::Value) -> Result<(), String> {
        // Stroke traffic outside the drawing phase is dropped, not answered
        if let Some(code) = self.current_room().await {
            if self.game_manager.phase(&code).await == Some(GamePhase::Drawing) {
                self.drawings
                    .append(self.connection_id.player_id(), draw_data)
                    .await;
            }
        }
        Ok(())
    }

    async fn handle_clear_canvas(&self) -> Result<(), String> {
        if let Some(code) = self.current_room().await {
            if self.game_manager.phase(&code).await == Some(GamePhase::Drawing) {
                self.drawings
                    .clear_player(self.connection_id.player_id())
                    .await;
            }
        }
        Ok(())
    }

    async fn handle_chat(&self, message: String) -> Result<(), String> {
        let connection = self
            .connections
            .get_connection(self.connection_id)
            .await
            .ok_or("Connection not found")?;
        let Some(code) = connection.room_code else {
            return Ok(());
        };

        self.connections
            .broadcast_to_room(
                &code,
                ServerMessage::Chat {
                    player_id: self.connection_id.player_id(),
                    player_name: connection.player_name.unwrap_or_default(),
                    message,
                    timestamp: chrono::Utc::now().timestamp_millis(),
                },
                None,
            )
            .await;

        Ok(())
    }

    async fn forward<F>(&self, build: F) -> Result<(), String>
    where
        F: FnOnce(game_types::PlayerId) -> SessionCommand,
    {
        let Some(code) = self.current_room().await else {
            return self.send_error(&RoomError::NotFound.to_string()).await;
        };

        match self
            .game_manager
            .command(&code, build(self.connection_id.player_id()))
            .await
        {
            Ok(()) => Ok(()),
            Err(error) => self.send_error(&error).await,
        }
    }

    async fn leave_current_room(&self, notify_self: bool) -> Result<(), String> {
        let Some(code) = self.current_room().await else {
            return Ok(());
        };
        let player_id = self.connection_id.player_id();

        // Let a running session resolve the departure before the roster moves
        let _ = self
            .game_manager
            .command(&code, SessionCommand::PlayerLeft { player: player_id })
            .await;

        match self.rooms.leave_room(&code, player_id).await {
            Ok(LeaveOutcome::Departed { room }) => {
                self.connections
                    .broadcast_to_room(
                        &code,
                        ServerMessage::PlayerLeft {
                            player_id,
                            players: room.players.clone(),
                            new_host_id: room.host_id,
                        },
                        Some(self.connection_id),
                    )
                    .await;
            }
            Ok(LeaveOutcome::RoomClosed) => {
                self.game_manager.end_session(&code).await;
            }
            Err(_) => {}
        }

        self.connections.set_room(self.connection_id, None).await;

        if notify_self {
            self.send_message(ServerMessage::LeftRoom).await?;
        }
        Ok(())
    }

    async fn current_room(&self) -> Option<String> {
        self.connections
            .get_connection(self.connection_id)
            .await
            .and_then(|connection| connection.room_code)
    }

    async fn send_message(&self, message: ServerMessage) -> Result<(), String> {
        self.connections
            .send_to_connection(self.connection_id, message)
            .await
    }

    async fn send_error(&self, error_message: &str) -> Result<(), String> {
        self.send_message(ServerMessage::Error {
            message: error_message.to_string(),
        })
        .await
    }
}
