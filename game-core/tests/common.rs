use game_core::{GameSession, SessionSettings, ShowingAdvance, WordCatalog};
use game_types::{Difficulty, GamePhase, Player, PlayerId};
use uuid::Uuid;

/// Catalog with a predictable candidate list: word1..wordN.
pub struct FixedCatalog;

impl WordCatalog for FixedCatalog {
    fn draw(&self, count: usize, _difficulty: Difficulty) -> Vec<String> {
        (1..=count).map(|i| format!("word{i}")).collect()
    }
}

pub fn test_player(name: &str, is_host: bool, is_observer: bool) -> Player {
    Player {
        id: Uuid::new_v4(),
        name: name.to_string(),
        color: "#45B7D1".to_string(),
        is_host,
        is_observer,
    }
}

/// Roster of named active players; the first is the host.
pub fn test_roster(names: &[&str]) -> Vec<Player> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| test_player(name, i == 0, false))
        .collect()
}

pub fn started_session(names: &[&str], settings: SessionSettings) -> GameSession {
    let mut session = GameSession::new(test_roster(names), Difficulty::Mixed, settings);
    let host = session.host_id;
    session.start(host, &FixedCatalog).unwrap();
    session
}

pub fn id_of(session: &GameSession, name: &str) -> PlayerId {
    session
        .players
        .iter()
        .find(|p| p.name == name)
        .map(|p| p.id)
        .unwrap_or_else(|| panic!("no player named {name}"))
}

pub fn total_score_of(session: &GameSession, name: &str) -> i32 {
    session.player_data[&id_of(session, name)].total_score
}

/// Drive an entire guessing pass in which nobody submits anything, then
/// settle the round. Leaves the session in Scoring (or Ended on the last
/// round).
pub fn play_out_round_silently(session: &mut GameSession) {
    let host = session.host_id;
    assert_eq!(session.phase, GamePhase::Drawing);

    session.force_finish_drawing();
    session.begin_next_target().unwrap();
    loop {
        session.settle_current_target().unwrap();
        match session.continue_from_showing(host).unwrap() {
            ShowingAdvance::NextTarget(_) => {}
            ShowingAdvance::RoundOver(_) => break,
        }
    }
}
