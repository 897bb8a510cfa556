use std::collections::{HashMap, HashSet};
use std::time::Duration;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use game_types::{
    Difficulty, FinalRanking, GameError, GamePhase, Player, PlayerId, PrivateAssignment,
    RoundStanding, TargetResult,
};

use crate::ledger::GuessLedger;
use crate::scoring::ScoringEngine;
use crate::words::WordCatalog;

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub total_rounds: u32,
    pub words_per_player: usize,
    pub drawing_duration: Duration,
    pub guessing_duration: Duration,
    pub min_players: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            total_rounds: 5,
            words_per_player: 7,
            drawing_duration: Duration::from_secs(80),
            guessing_duration: Duration::from_secs(20),
            min_players: 2,
        }
    }
}

/// Per-player state for the round in flight, plus the accumulated total.
#[derive(Debug, Clone, Default)]
pub struct PlayerRound {
    pub words: Vec<String>,
    pub assigned_number: u8,
    pub has_finished_drawing: bool,
    pub round_score: i32,
    pub total_score: i32,
}

impl PlayerRound {
    pub fn assigned_word(&self) -> Option<&str> {
        self.assigned_number
            .checked_sub(1)
            .and_then(|index| self.words.get(index as usize))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineKind {
    Drawing,
    Guessing,
}

/// Identifies the exact phase instance a scheduled deadline belongs to. A
/// firing whose token no longer matches the session is stale and must be
/// ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineToken {
    pub round: u32,
    pub kind: DeadlineKind,
    pub guessing_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundStarted {
    pub round: u32,
    pub total_rounds: u32,
    pub duration: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawingAck {
    pub already_finished: bool,
    pub all_finished: bool,
}

#[derive(Debug, Clone)]
pub struct TargetIntro {
    pub target_player_id: PlayerId,
    pub target_player_name: String,
    pub target_player_color: String,
    pub words: Vec<String>,
    /// 1-based position for display.
    pub guessing_index: u32,
    pub total_targets: u32,
    pub duration: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuessAck {
    pub is_correct: bool,
    pub all_guessed: bool,
}

#[derive(Debug, Clone)]
pub struct TargetSettlement {
    pub target_player_id: PlayerId,
    pub correct_answer: u8,
    pub correct_word: String,
    pub results: Vec<TargetResult>,
    pub has_more_targets: bool,
}

#[derive(Debug, Clone)]
pub struct RoundSettlement {
    pub round: u32,
    pub results: Vec<RoundStanding>,
    pub is_game_end: bool,
}

#[derive(Debug, Clone)]
pub enum ShowingAdvance {
    NextTarget(TargetIntro),
    RoundOver(RoundSettlement),
}

/// What a mid-game departure obliges the caller to do next.
#[derive(Debug, Clone, Copy, Default)]
pub struct DepartureEffect {
    pub removed: bool,
    pub drawing_complete: bool,
    pub target_departed: bool,
    pub guessing_complete: bool,
}

/// The per-room session state machine. Synchronous: the caller owns
/// serialization, timers, and timestamps; every operation either applies one
/// transition or rejects without touching state.
#[derive(Debug)]
pub struct GameSession {
    pub phase: GamePhase,
    pub round: u32,
    pub settings: SessionSettings,
    pub difficulty: Difficulty,
    pub host_id: PlayerId,
    /// Roster snapshot frozen at session start, observers included.
    pub players: Vec<Player>,
    /// Non-observer ids, frozen at session start. Late joiners never enter.
    pub active_player_ids: Vec<PlayerId>,
    pub player_data: HashMap<PlayerId, PlayerRound>,
    pub guessing_order: Vec<PlayerId>,
    pub guessing_index: usize,
    pub current_target: Option<PlayerId>,
    pub ledger: GuessLedger,
    departed: HashSet<PlayerId>,
}

impl GameSession {
    pub fn new(players: Vec<Player>, difficulty: Difficulty, settings: SessionSettings) -> Self {
        let host_id = players
            .iter()
            .find(|p| p.is_host)
            .or_else(|| players.first())
            .map(|p| p.id)
            .unwrap_or_default();

        let active_player_ids: Vec<PlayerId> = players
            .iter()
            .filter(|p| p.is_active())
            .map(|p| p.id)
            .collect();

        let player_data = active_player_ids
            .iter()
            .map(|id| (*id, PlayerRound::default()))
            .collect();

        Self {
            phase: GamePhase::Waiting,
            round: 0,
            settings,
            difficulty,
            host_id,
            players,
            active_player_ids,
            player_data,
            guessing_order: Vec::new(),
            guessing_index: 0,
            current_target: None,
            ledger: GuessLedger::new(),
            departed: HashSet::new(),
        }
    }

    /// Active players still present.
    pub fn remaining_active(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.active_player_ids
            .iter()
            .copied()
            .filter(|id| !self.departed.contains(id))
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Host-issued start out of the waiting phase.
    pub fn start(
        &mut self,
        issuer: PlayerId,
        catalog: &dyn WordCatalog,
    ) -> Result<RoundStarted, GameError> {
        if self.phase != GamePhase::Waiting {
            return Err(GameError::WrongPhase { actual: self.phase });
        }
        if issuer != self.host_id {
            return Err(GameError::NotHost);
        }
        if self.remaining_active().count() < self.settings.min_players {
            return Err(GameError::NotEnoughPlayers {
                needed: self.settings.min_players,
            });
        }

        Ok(self.start_round(catalog))
    }

    /// Host-issued advance out of the scoring phase into the next round.
    pub fn next_round(
        &mut self,
        issuer: PlayerId,
        catalog: &dyn WordCatalog,
    ) -> Result<RoundStarted, GameError> {
        match self.phase {
            GamePhase::Scoring => {}
            GamePhase::Ended => return Err(GameError::GameOver),
            actual => return Err(GameError::WrongPhase { actual }),
        }
        if issuer != self.host_id {
            return Err(GameError::NotHost);
        }

        Ok(self.start_round(catalog))
    }

    fn start_round(&mut self, catalog: &dyn WordCatalog) -> RoundStarted {
        let mut rng = rand::thread_rng();

        self.round += 1;
        self.phase = GamePhase::Drawing;

        let word_count = self.settings.words_per_player;
        for id in self.active_player_ids.clone() {
            if self.departed.contains(&id) {
                continue;
            }
            if let Some(data) = self.player_data.get_mut(&id) {
                data.words = catalog.draw(word_count, self.difficulty);
                // Independent across players; numbers are not globally unique
                data.assigned_number = rng.gen_range(1..=word_count as u8);
                data.has_finished_drawing = false;
                data.round_score = 0;
            }
        }

        self.ledger.reset_round();

        let mut order: Vec<PlayerId> = self.remaining_active().collect();
        order.shuffle(&mut rng);
        self.guessing_order = order;
        self.guessing_index = 0;
        self.current_target = None;

        debug!(round = self.round, "round started");

        RoundStarted {
            round: self.round,
            total_rounds: self.settings.total_rounds,
            duration: self.settings.drawing_duration,
        }
    }

    /// A player's own candidate list and secret. None for observers and
    /// before the first round.
    pub fn private_info(&self, player: PlayerId) -> Option<PrivateAssignment> {
        if self.phase == GamePhase::Waiting {
            return None;
        }
        let data = self.player_data.get(&player)?;
        Some(PrivateAssignment {
            words: data.words.clone(),
            assigned_number: data.assigned_number,
            assigned_word: data.assigned_word()?.to_string(),
            has_finished_drawing: data.has_finished_drawing,
        })
    }

    /// Mark a player done drawing. Idempotent: repeat signals are no-ops
    /// reported as `already_finished`.
    pub fn finish_drawing(&mut self, player: PlayerId) -> Result<DrawingAck, GameError> {
        if self.phase != GamePhase::Drawing {
            return Err(GameError::WrongPhase { actual: self.phase });
        }
        if self.player(player).is_none() {
            return Err(GameError::UnknownPlayer);
        }

        let already_finished = {
            let data = self
                .player_data
                .get_mut(&player)
                .ok_or(GameError::ObserverExcluded)?;
            let already = data.has_finished_drawing;
            data.has_finished_drawing = true;
            already
        };

        Ok(DrawingAck {
            already_finished,
            all_finished: self.all_finished_drawing(),
        })
    }

    pub fn all_finished_drawing(&self) -> bool {
        self.remaining_active().all(|id| {
            self.player_data
                .get(&id)
                .is_some_and(|data| data.has_finished_drawing)
        })
    }

    /// Drawing deadline fired: whoever has not finished is finished now.
    pub fn force_finish_drawing(&mut self) {
        for data in self.player_data.values_mut() {
            data.has_finished_drawing = true;
        }
    }

    /// Pop the next target off the guessing order, or None when exhausted.
    pub fn begin_next_target(&mut self) -> Option<TargetIntro> {
        if self.guessing_index >= self.guessing_order.len() {
            return None;
        }

        self.phase = GamePhase::Guessing;
        let target_id = self.guessing_order[self.guessing_index];
        self.current_target = Some(target_id);
        self.ledger.begin_target();

        let target = self.player(target_id)?;
        let words = self
            .player_data
            .get(&target_id)
            .map(|data| data.words.clone())
            .unwrap_or_default();

        Some(TargetIntro {
            target_player_id: target_id,
            target_player_name: target.name.clone(),
            target_player_color: target.color.clone(),
            words,
            guessing_index: self.guessing_index as u32 + 1,
            total_targets: self.guessing_order.len() as u32,
            duration: self.settings.guessing_duration,
        })
    }

    /// Everyone allowed to guess the current target: active, still present,
    /// and not the target themselves.
    pub fn eligible_guessers(&self) -> Vec<PlayerId> {
        match self.current_target {
            Some(target) => self.remaining_active().filter(|id| *id != target).collect(),
            None => Vec::new(),
        }
    }

    pub fn current_target_complete(&self) -> bool {
        match self.current_target {
            Some(target) => self.ledger.all_guessed(self.eligible_guessers(), target),
            None => false,
        }
    }

    /// Accept or reject one guess against the current target. Only the
    /// boolean verdict leaks back to the guesser; the true number stays
    /// private until the reveal.
    pub fn submit_guess(
        &mut self,
        guesser: PlayerId,
        number: u8,
        timestamp: i64,
    ) -> Result<GuessAck, GameError> {
        if self.phase != GamePhase::Guessing {
            return Err(GameError::WrongPhase { actual: self.phase });
        }
        let target = self.current_target.ok_or(GameError::NoActiveTarget)?;
        if self.player(guesser).is_none() {
            return Err(GameError::UnknownPlayer);
        }
        if !self.player_data.contains_key(&guesser) {
            return Err(GameError::ObserverExcluded);
        }
        if self.departed.contains(&guesser) {
            return Err(GameError::UnknownPlayer);
        }
        if guesser == target {
            return Err(GameError::SelfGuess);
        }
        let max = self.settings.words_per_player as u8;
        if number < 1 || number > max {
            return Err(GameError::InvalidGuessNumber { max });
        }

        let assigned = self
            .player_data
            .get(&target)
            .map(|data| data.assigned_number)
            .ok_or(GameError::NoActiveTarget)?;
        let is_correct = number == assigned;

        self.ledger
            .record(guesser, target, number, is_correct, timestamp)?;

        Ok(GuessAck {
            is_correct,
            all_guessed: self.current_target_complete(),
        })
    }

    /// Settle the target on display: score the ledger, advance the cursor,
    /// move to showing.
    pub fn settle_current_target(&mut self) -> Result<TargetSettlement, GameError> {
        if self.phase != GamePhase::Guessing {
            return Err(GameError::WrongPhase { actual: self.phase });
        }
        let target = self.current_target.ok_or(GameError::NoActiveTarget)?;
        let target_data = self
            .player_data
            .get(&target)
            .ok_or(GameError::NoActiveTarget)?;

        let correct_answer = target_data.assigned_number;
        let correct_word = target_data
            .assigned_word()
            .map(str::to_string)
            .unwrap_or_default();

        let abstained: Vec<PlayerId> = self
            .eligible_guessers()
            .into_iter()
            .filter(|id| !self.ledger.has_guessed(*id, target))
            .collect();

        let results =
            ScoringEngine::settle_target(self.ledger.current_guesses(), &abstained, &self.players);

        for result in &results {
            if let Some(data) = self.player_data.get_mut(&result.player_id) {
                data.round_score += result.score;
            }
        }

        self.guessing_index += 1;
        self.phase = GamePhase::Showing;

        Ok(TargetSettlement {
            target_player_id: target,
            correct_answer,
            correct_word,
            results,
            has_more_targets: self.guessing_index < self.guessing_order.len(),
        })
    }

    /// Host-issued continue out of showing: next target, or round settlement
    /// once the order is exhausted.
    pub fn continue_from_showing(&mut self, issuer: PlayerId) -> Result<ShowingAdvance, GameError> {
        if self.phase != GamePhase::Showing {
            return Err(GameError::WrongPhase { actual: self.phase });
        }
        if issuer != self.host_id {
            return Err(GameError::NotHost);
        }

        match self.begin_next_target() {
            Some(intro) => Ok(ShowingAdvance::NextTarget(intro)),
            None => Ok(ShowingAdvance::RoundOver(self.settle_round())),
        }
    }

    /// Fold round scores into totals for everyone, observers at zero, and
    /// decide whether the game is over. Reached through
    /// `continue_from_showing` once the order is exhausted, or directly when
    /// every remaining target departed mid-round.
    pub fn settle_round(&mut self) -> RoundSettlement {
        self.phase = GamePhase::Scoring;
        self.current_target = None;

        let mut standings = Vec::with_capacity(self.players.len());
        for player in &self.players {
            let (round_score, total_score) = match self.player_data.get_mut(&player.id) {
                Some(data) => {
                    data.total_score += data.round_score;
                    (data.round_score, data.total_score)
                }
                None => (0, 0),
            };
            standings.push(RoundStanding {
                player_id: player.id,
                player_name: player.name.clone(),
                player_color: player.color.clone(),
                round_score,
                total_score,
            });
        }

        let is_game_end = self.round >= self.settings.total_rounds;
        if is_game_end {
            self.phase = GamePhase::Ended;
        }

        RoundSettlement {
            round: self.round,
            results: ScoringEngine::round_standings(standings),
            is_game_end,
        }
    }

    pub fn final_rankings(&self) -> Vec<FinalRanking> {
        ScoringEngine::final_rankings(&self.players, |id| {
            self.player_data
                .get(&id)
                .map(|data| data.total_score)
                .unwrap_or(0)
        })
    }

    /// A roster member left the room mid-game. Their captured data is kept;
    /// they are only removed from future targeting and eligibility. The
    /// returned effect tells the caller which advancement this forced.
    pub fn remove_player(&mut self, player: PlayerId) -> DepartureEffect {
        let mut effect = DepartureEffect::default();
        if self.player(player).is_none() || self.departed.contains(&player) {
            return effect;
        }

        let was_participant = self.player_data.contains_key(&player);
        self.departed.insert(player);

        if self.host_id == player {
            // Same rule the room directory applies: earliest remaining
            // roster member inherits the host seat
            if let Some(next) = self
                .players
                .iter()
                .find(|p| p.id != player && !self.departed.contains(&p.id))
            {
                self.host_id = next.id;
            }
        }

        if !was_participant {
            return effect;
        }
        effect.removed = true;

        match self.phase {
            GamePhase::Drawing => {
                if let Some(data) = self.player_data.get_mut(&player) {
                    data.has_finished_drawing = true;
                }
                self.guessing_order.retain(|id| *id != player);
                effect.drawing_complete = self.all_finished_drawing();
            }
            GamePhase::Guessing => {
                if self.current_target == Some(player) {
                    effect.target_departed = true;
                } else {
                    if let Some(pos) = self.guessing_order.iter().position(|id| *id == player) {
                        if pos > self.guessing_index {
                            self.guessing_order.remove(pos);
                        }
                    }
                    effect.guessing_complete = self.current_target_complete();
                }
            }
            GamePhase::Showing => {
                if let Some(pos) = self.guessing_order.iter().position(|id| *id == player) {
                    if pos >= self.guessing_index {
                        self.guessing_order.remove(pos);
                    }
                }
            }
            _ => {}
        }

        effect
    }

    pub fn drawing_deadline_token(&self) -> DeadlineToken {
        DeadlineToken {
            round: self.round,
            kind: DeadlineKind::Drawing,
            guessing_index: 0,
        }
    }

    pub fn guessing_deadline_token(&self) -> DeadlineToken {
        DeadlineToken {
            round: self.round,
            kind: DeadlineKind::Guessing,
            guessing_index: self.guessing_index,
        }
    }

    /// False once the phase instance the token was minted for has been
    /// exited — by either trigger.
    pub fn is_deadline_current(&self, token: DeadlineToken) -> bool {
        if token.round != self.round {
            return false;
        }
        match token.kind {
            DeadlineKind::Drawing => self.phase == GamePhase::Drawing,
            DeadlineKind::Guessing => {
                self.phase == GamePhase::Guessing && token.guessing_index == self.guessing_index
            }
        }
    }
}
