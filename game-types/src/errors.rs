use thiserror::Error;

use crate::game::GamePhase;

/// Precondition violations against a running session. Reported to the
/// offending caller only; session state is never changed by a rejected
/// command, so every one of these is recoverable by retrying correctly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("only the host can do that")]
    NotHost,
    #[error("at least {needed} players are required to start")]
    NotEnoughPlayers { needed: usize },
    #[error("that action is not allowed during the {actual:?} phase")]
    WrongPhase { actual: GamePhase },
    #[error("observers cannot take part in the game")]
    ObserverExcluded,
    #[error("player is not part of this game")]
    UnknownPlayer,
    #[error("you cannot guess your own drawing")]
    SelfGuess,
    #[error("you have already submitted a guess for this drawing")]
    DuplicateGuess,
    #[error("guess must be a number between 1 and {max}")]
    InvalidGuessNumber { max: u8 },
    #[error("no drawing is currently being guessed")]
    NoActiveTarget,
    #[error("the game has already ended")]
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("room not found")]
    NotFound,
    #[error("the room is full (at most {max} players)")]
    Full { max: usize },
    #[error("the game has already started")]
    AlreadyStarted,
    #[error("you are already in the room")]
    AlreadyJoined,
    #[error("a player name is required")]
    NameRequired,
    #[error("a valid room code is required")]
    InvalidCode,
    #[error("a game is already running in this room")]
    GameInProgress,
}
