use std::env;
use std::time::Duration;

use game_core::SessionSettings;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub total_rounds: u32,
    pub words_per_player: usize,
    pub drawing_seconds: u64,
    pub guessing_seconds: u64,
    pub min_players: usize,
    pub max_players_per_room: usize,
    pub room_ttl_minutes: u64,
    pub connection_timeout_seconds: u64,
}

impl Config {
    pub fn new() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("Invalid PORT"),
            total_rounds: env::var("TOTAL_ROUNDS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .expect("Invalid TOTAL_ROUNDS"),
            words_per_player: env::var("WORDS_PER_PLAYER")
                .unwrap_or_else(|_| "7".to_string())
                .parse()
                .expect("Invalid WORDS_PER_PLAYER"),
            drawing_seconds: env::var("DRAWING_SECONDS")
                .unwrap_or_else(|_| "80".to_string())
                .parse()
                .expect("Invalid DRAWING_SECONDS"),
            guessing_seconds: env::var("GUESSING_SECONDS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .expect("Invalid GUESSING_SECONDS"),
            min_players: env::var("MIN_PLAYERS")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .expect("Invalid MIN_PLAYERS"),
            max_players_per_room: env::var("MAX_PLAYERS_PER_ROOM")
                .unwrap_or_else(|_| "6".to_string())
                .parse()
                .expect("Invalid MAX_PLAYERS_PER_ROOM"),
            room_ttl_minutes: env::var("ROOM_TTL_MINUTES")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .expect("Invalid ROOM_TTL_MINUTES"),
            connection_timeout_seconds: env::var("CONNECTION_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .expect("Invalid CONNECTION_TIMEOUT_SECONDS"),
        }
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            total_rounds: self.total_rounds,
            words_per_player: self.words_per_player,
            drawing_duration: Duration::from_secs(self.drawing_seconds),
            guessing_duration: Duration::from_secs(self.guessing_seconds),
            min_players: self.min_players,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
