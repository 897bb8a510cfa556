use std::collections::HashMap;

use game_types::{GameError, PlayerId};

/// A single recorded guess against one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedGuess {
    pub number: u8,
    pub timestamp: i64,
}

/// A guess as accepted against the target currently on display.
#[derive(Debug, Clone)]
pub struct AcceptedGuess {
    pub guesser_id: PlayerId,
    pub number: u8,
    pub is_correct: bool,
    pub timestamp: i64,
}

/// Per-round guess bookkeeping. Owned exclusively by one session for the
/// round's duration. `current` keeps acceptance order for the target on
/// display, so equal timestamps settle by arrival.
#[derive(Debug, Default)]
pub struct GuessLedger {
    records: HashMap<PlayerId, HashMap<PlayerId, RecordedGuess>>,
    current: Vec<AcceptedGuess>,
}

impl GuessLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything recorded during the previous round.
    pub fn reset_round(&mut self) {
        self.records.clear();
        self.current.clear();
    }

    /// Start accumulating against a fresh target.
    pub fn begin_target(&mut self) {
        self.current.clear();
    }

    pub fn has_guessed(&self, guesser: PlayerId, target: PlayerId) -> bool {
        self.records
            .get(&guesser)
            .is_some_and(|targets| targets.contains_key(&target))
    }

    /// Record a guess, enforcing the at-most-once protocol. A guesser never
    /// holds an entry for themselves.
    pub fn record(
        &mut self,
        guesser: PlayerId,
        target: PlayerId,
        number: u8,
        is_correct: bool,
        timestamp: i64,
    ) -> Result<(), GameError> {
        if guesser == target {
            return Err(GameError::SelfGuess);
        }

        let targets = self.records.entry(guesser).or_default();
        if targets.contains_key(&target) {
            return Err(GameError::DuplicateGuess);
        }

        targets.insert(target, RecordedGuess { number, timestamp });
        self.current.push(AcceptedGuess {
            guesser_id: guesser,
            number,
            is_correct,
            timestamp,
        });

        Ok(())
    }

    /// Guesses against the current target, in acceptance order.
    pub fn current_guesses(&self) -> &[AcceptedGuess] {
        &self.current
    }

    /// True once every eligible guesser has exactly one recorded guess
    /// against `target`.
    pub fn all_guessed<I>(&self, eligible: I, target: PlayerId) -> bool
    where
        I: IntoIterator<Item = PlayerId>,
    {
        eligible.into_iter().all(|id| self.has_guessed(id, target))
    }
}
