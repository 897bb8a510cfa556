use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{RwLock, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use game_core::{
    DeadlineKind, DeadlineToken, GameSession, RoundSettlement, RoundStarted, SessionSettings,
    ShowingAdvance, TargetIntro, WordCatalog,
};
use game_types::{GamePhase, PlayerId, RoomError, ServerMessage};

use crate::drawing::DrawingStore;
use crate::room_directory::RoomDirectory;
use crate::websocket::connection::ConnectionManager;

/// Everything that may mutate a running session travels through this enum —
/// player actions and deadline firings share one serialized queue per room.
#[derive(Debug, Clone, Copy)]
pub enum SessionCommand {
    FinishDrawing { player: PlayerId },
    SubmitGuess { player: PlayerId, number: u8 },
    NextGuessing { issuer: PlayerId },
    NextRound { issuer: PlayerId },
    PlayerLeft { player: PlayerId },
    DeadlineFired { token: DeadlineToken },
    Shutdown,
}

struct SessionHandle {
    tx: mpsc::UnboundedSender<SessionCommand>,
    state: Arc<RwLock<GameSession>>,
}

/// Registry of per-room session actors. Rooms are fully independent; each
/// started room gets one task that owns its session's mutations.
pub struct GameManager {
    sessions: RwLock<HashMap<String, SessionHandle>>,
    rooms: Arc<RoomDirectory>,
    connections: Arc<ConnectionManager>,
    drawings: Arc<DrawingStore>,
    catalog: Arc<dyn WordCatalog>,
    settings: SessionSettings,
}

impl GameManager {
    pub fn new(
        rooms: Arc<RoomDirectory>,
        connections: Arc<ConnectionManager>,
        drawings: Arc<DrawingStore>,
        catalog: Arc<dyn WordCatalog>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            rooms,
            connections,
            drawings,
            catalog,
            settings,
        }
    }

    /// Validate and launch a session for the room, emitting the first
    /// round's events. The issuer must be the room host.
    pub async fn start_game(&self, room_code: &str, issuer: PlayerId) -> Result<(), String> {
        let room = self
            .rooms
            .get_room(room_code)
            .await
            .ok_or_else(|| RoomError::NotFound.to_string())?;

        {
            let sessions = self.sessions.read().await;
            if let Some(handle) = sessions.get(room_code) {
                if !handle.tx.is_closed() && handle.state.read().await.phase != GamePhase::Ended {
                    return Err(RoomError::GameInProgress.to_string());
                }
            }
        }

        let mut session =
            GameSession::new(room.players.clone(), room.difficulty, self.settings.clone());
        let started = session
            .start(issuer, self.catalog.as_ref())
            .map_err(|e| e.to_string())?;

        self.rooms.set_in_game(room_code, true).await;
        let roster: Vec<PlayerId> = room.players.iter().map(|p| p.id).collect();
        self.drawings.clear_players(&roster).await;

        let state = Arc::new(RwLock::new(session));
        let (tx, rx) = mpsc::unbounded_channel();

        let actor = SessionActor {
            room_code: room_code.to_string(),
            state: state.clone(),
            connections: self.connections.clone(),
            drawings: self.drawings.clone(),
            rooms: self.rooms.clone(),
            catalog: self.catalog.clone(),
            tx: tx.clone(),
            timer: None,
        };

        {
            let mut sessions = self.sessions.write().await;
            sessions.insert(room_code.to_string(), SessionHandle { tx, state });
        }

        tokio::spawn(actor.run(rx, started));
        info!("game started in room {}", room_code);
        Ok(())
    }

    /// Enqueue a command on the room's serialized queue.
    pub async fn command(&self, room_code: &str, command: SessionCommand) -> Result<(), String> {
        let sessions = self.sessions.read().await;
        match sessions.get(room_code) {
            Some(handle) if !handle.tx.is_closed() => handle
                .tx
                .send(command)
                .map_err(|_| "the game has not started".to_string()),
            _ => Err("the game has not started".to_string()),
        }
    }

    /// Read-only phase peek, used to gate stroke capture.
    pub async fn phase(&self, room_code: &str) -> Option<GamePhase> {
        let sessions = self.sessions.read().await;
        let handle = sessions.get(room_code)?;
        Some(handle.state.read().await.phase)
    }

    /// Tear down the session for a room that emptied or expired.
    pub async fn end_session(&self, room_code: &str) {
        let handle = {
            let mut sessions = self.sessions.write().await;
            sessions.remove(room_code)
        };
        if let Some(handle) = handle {
            let _ = handle.tx.send(SessionCommand::Shutdown);
            debug!("session for room {} shut down", room_code);
        }
        self.rooms.set_in_game(room_code, false).await;
    }

    pub async fn cleanup_expired_rooms(&self, ttl: Duration) {
        for code in self.rooms.cleanup_expired(ttl).await {
            info!("removed expired room {}", code);
            self.end_session(&code).await;
        }
    }

    pub async fn active_session_count(&self) -> usize {
        let sessions = self.sessions.read().await;
        let mut count = 0;
        for handle in sessions.values() {
            if !handle.tx.is_closed() {
                count += 1;
            }
        }
        count
    }
}

/// One per started room. Owns all session mutations: commands arrive over
/// the mailbox one at a time, so a deadline firing and a completing player
/// action can never interleave destructively.
struct SessionActor {
    room_code: String,
    state: Arc<RwLock<GameSession>>,
    connections: Arc<ConnectionManager>,
    drawings: Arc<DrawingStore>,
    rooms: Arc<RoomDirectory>,
    catalog: Arc<dyn WordCatalog>,
    tx: mpsc::UnboundedSender<SessionCommand>,
    timer: Option<JoinHandle<()>>,
}

impl SessionActor {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<SessionCommand>, started: RoundStarted) {
        self.announce_round(started).await;
        self.arm_drawing_deadline().await;

        while let Some(command) = rx.recv().await {
            match command {
                SessionCommand::FinishDrawing { player } => self.on_finish_drawing(player).await,
                SessionCommand::SubmitGuess { player, number } => {
                    self.on_submit_guess(player, number).await
                }
                SessionCommand::NextGuessing { issuer } => self.on_next_guessing(issuer).await,
                SessionCommand::NextRound { issuer } => self.on_next_round(issuer).await,
                SessionCommand::PlayerLeft { player } => self.on_player_left(player).await,
                SessionCommand::DeadlineFired { token } => self.on_deadline(token).await,
                SessionCommand::Shutdown => break,
            }

            if self.state.read().await.phase == GamePhase::Ended {
                break;
            }
        }

        self.cancel_timer();
        self.rooms.set_in_game(&self.room_code, false).await;
        debug!("session actor for room {} stopped", self.room_code);
    }

    async fn announce_round(&self, started: RoundStarted) {
        let (players, assignments) = {
            let session = self.state.read().await;
            let assignments: Vec<(PlayerId, _)> = session
                .remaining_active()
                .filter_map(|id| session.private_info(id).map(|info| (id, info)))
                .collect();
            (session.players.clone(), assignments)
        };

        self.connections
            .broadcast_to_room(
                &self.room_code,
                ServerMessage::DrawingPhaseStarted {
                    round: started.round,
                    total_rounds: started.total_rounds,
                    duration: started.duration.as_millis() as u64,
                    players,
                },
                None,
            )
            .await;

        for (player, info) in assignments {
            let _ = self
                .connections
                .send_to_player(
                    player,
                    ServerMessage::PrivateInfo {
                        words: info.words,
                        assigned_number: info.assigned_number,
                        assigned_word: info.assigned_word,
                    },
                )
                .await;
        }
    }

    async fn arm_drawing_deadline(&mut self) {
        let (token, duration) = {
            let session = self.state.read().await;
            (
                session.drawing_deadline_token(),
                session.settings.drawing_duration,
            )
        };
        self.arm_deadline(token, duration);
    }

    fn arm_deadline(&mut self, token: DeadlineToken, duration: Duration) {
        self.cancel_timer();
        let tx = self.tx.clone();
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = tx.send(SessionCommand::DeadlineFired { token });
        }));
    }

    /// Timers of an exited phase must not survive into the next one.
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    async fn report(&self, player: PlayerId, message: String) {
        let _ = self
            .connections
            .send_to_player(player, ServerMessage::Error { message })
            .await;
    }

    async fn on_finish_drawing(&mut self, player: PlayerId) {
        let outcome = {
            let mut session = self.state.write().await;
            session.finish_drawing(player).map(|ack| {
                let name = session
                    .player(player)
                    .map(|p| p.name.clone())
                    .unwrap_or_default();
                (ack, name)
            })
        };

        match outcome {
            Ok((ack, _)) if ack.already_finished => {}
            Ok((ack, player_name)) => {
                self.connections
                    .broadcast_to_room(
                        &self.room_code,
                        ServerMessage::PlayerFinishedDrawing {
                            player_id: player,
                            player_name,
                        },
                        None,
                    )
                    .await;

                if ack.all_finished {
                    self.cancel_timer();
                    self.advance_to_guessing().await;
                }
            }
            Err(error) => self.report(player, error.to_string()).await,
        }
    }

    async fn on_submit_guess(&mut self, player: PlayerId, number: u8) {
        let now = chrono::Utc::now().timestamp_millis();
        let result = {
            let mut session = self.state.write().await;
            session.submit_guess(player, number, now)
        };

        match result {
            Ok(ack) => {
                let _ = self
                    .connections
                    .send_to_player(
                        player,
                        ServerMessage::GuessSubmitted {
                            is_correct: ack.is_correct,
                        },
                    )
                    .await;

                if ack.all_guessed {
                    self.settle_target().await;
                }
            }
            Err(error) => self.report(player, error.to_string()).await,
        }
    }

    async fn on_next_guessing(&mut self, issuer: PlayerId) {
        let advance = {
            let mut session = self.state.write().await;
            session.continue_from_showing(issuer)
        };

        match advance {
            Ok(ShowingAdvance::NextTarget(intro)) => self.emit_target(intro).await,
            Ok(ShowingAdvance::RoundOver(settlement)) => {
                self.emit_round_settlement(settlement).await
            }
            Err(error) => self.report(issuer, error.to_string()).await,
        }
    }

    async fn on_next_round(&mut self, issuer: PlayerId) {
        let started = {
            let mut session = self.state.write().await;
            session.next_round(issuer, self.catalog.as_ref())
        };

        match started {
            Ok(info) => {
                let roster: Vec<PlayerId> = {
                    let session = self.state.read().await;
                    session.players.iter().map(|p| p.id).collect()
                };
                self.drawings.clear_players(&roster).await;
                self.announce_round(info).await;
                self.arm_drawing_deadline().await;
            }
            Err(error) => self.report(issuer, error.to_string()).await,
        }
    }

    async fn on_player_left(&mut self, player: PlayerId) {
        let effect = {
            let mut session = self.state.write().await;
            session.remove_player(player)
        };

        if !effect.removed {
            return;
        }

        if effect.drawing_complete {
            self.cancel_timer();
            self.advance_to_guessing().await;
        } else if effect.target_departed || effect.guessing_complete {
            self.settle_target().await;
        }
    }

    async fn on_deadline(&mut self, token: DeadlineToken) {
        // A completing action may have advanced the phase before this firing
        // was dequeued; such triggers are discarded silently.
        let current = {
            let session = self.state.read().await;
            session.is_deadline_current(token)
        };
        if !current {
            debug!("stale deadline ignored in room {}", self.room_code);
            return;
        }

        match token.kind {
            DeadlineKind::Drawing => {
                {
                    let mut session = self.state.write().await;
                    session.force_finish_drawing();
                }
                self.advance_to_guessing().await;
            }
            DeadlineKind::Guessing => self.settle_target().await,
        }
    }

    async fn advance_to_guessing(&mut self) {
        let intro = {
            let mut session = self.state.write().await;
            session.begin_next_target()
        };

        match intro {
            Some(intro) => self.emit_target(intro).await,
            None => {
                // Every remaining target departed mid-round
                let settlement = {
                    let mut session = self.state.write().await;
                    session.settle_round()
                };
                self.emit_round_settlement(settlement).await;
            }
        }
    }

    async fn emit_target(&mut self, intro: TargetIntro) {
        let target = intro.target_player_id;
        let duration = intro.duration;
        let drawings = self.drawings.strokes_for(target).await;

        self.connections
            .broadcast_to_room(
                &self.room_code,
                ServerMessage::GuessingPhaseStarted {
                    target_player_id: target,
                    target_player_name: intro.target_player_name,
                    target_player_color: intro.target_player_color,
                    words: intro.words,
                    guessing_index: intro.guessing_index,
                    total_targets: intro.total_targets,
                    duration: duration.as_millis() as u64,
                    drawings,
                },
                None,
            )
            .await;

        let (token, complete) = {
            let session = self.state.read().await;
            (
                session.guessing_deadline_token(),
                session.current_target_complete(),
            )
        };

        if complete {
            // Nobody is left to guess this drawing
            self.settle_target().await;
        } else {
            self.arm_deadline(token, duration);
        }
    }

    async fn settle_target(&mut self) {
        self.cancel_timer();
        let settlement = {
            let mut session = self.state.write().await;
            session.settle_current_target()
        };

        match settlement {
            Ok(settlement) => {
                self.connections
                    .broadcast_to_room(
                        &self.room_code,
                        ServerMessage::GuessingEnded {
                            target_player_id: settlement.target_player_id,
                            correct_answer: settlement.correct_answer,
                            correct_word: settlement.correct_word,
                            results: settlement.results,
                            has_more_targets: settlement.has_more_targets,
                        },
                        None,
                    )
                    .await;
            }
            Err(error) => {
                warn!(
                    "target settlement failed in room {}: {}",
                    self.room_code, error
                );
            }
        }
    }

    async fn emit_round_settlement(&mut self, settlement: RoundSettlement) {
        self.cancel_timer();
        let is_game_end = settlement.is_game_end;

        self.connections
            .broadcast_to_room(
                &self.room_code,
                ServerMessage::RoundEnded {
                    round: settlement.round,
                    results: settlement.results,
                    is_game_end,
                },
                None,
            )
            .await;

        if is_game_end {
            let rankings = {
                let session = self.state.read().await;
                session.final_rankings()
            };
            self.connections
                .broadcast_to_room(&self.room_code, ServerMessage::GameEnded { rankings }, None)
                .await;
        }
    }
}
