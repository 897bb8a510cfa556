mod test_helpers;

use std::time::Duration;

use game_core::SessionSettings;
use game_server::game_manager::SessionCommand;
use game_types::{GamePhase, ServerMessage};
use test_helpers::TestRig;

fn short_settings() -> SessionSettings {
    SessionSettings {
        total_rounds: 1,
        ..Default::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_start_game_announces_round_and_secrets() {
    let rig = TestRig::new(SessionSettings::default());
    let (code, mut players) = rig.setup_room(&["Alice", "Bob"]).await;

    rig.manager.start_game(&code, players[0].id).await.unwrap();

    for player in &mut players {
        let started = player
            .next_matching(|m| matches!(m, ServerMessage::DrawingPhaseStarted { .. }))
            .await;
        if let ServerMessage::DrawingPhaseStarted {
            round,
            total_rounds,
            players,
            ..
        } = started
        {
            assert_eq!(round, 1);
            assert_eq!(total_rounds, 5);
            assert_eq!(players.len(), 2);
        }

        let private = player
            .next_matching(|m| matches!(m, ServerMessage::PrivateInfo { .. }))
            .await;
        if let ServerMessage::PrivateInfo {
            words,
            assigned_number,
            assigned_word,
        } = private
        {
            assert_eq!(words.len(), 7);
            assert_eq!(words[assigned_number as usize - 1], assigned_word);
        }
    }

    assert_eq!(rig.manager.phase(&code).await, Some(GamePhase::Drawing));
    assert_eq!(rig.manager.active_session_count().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_start_game_twice_is_rejected() {
    let rig = TestRig::new(SessionSettings::default());
    let (code, players) = rig.setup_room(&["Alice", "Bob"]).await;

    rig.manager.start_game(&code, players[0].id).await.unwrap();
    let second = rig.manager.start_game(&code, players[0].id).await;
    assert!(second.unwrap_err().contains("already running"));
}

#[tokio::test(start_paused = true)]
async fn test_drawing_deadline_forces_guessing_phase() {
    let rig = TestRig::new(SessionSettings::default());
    let (code, mut players) = rig.setup_room(&["Alice", "Bob"]).await;
    rig.manager.start_game(&code, players[0].id).await.unwrap();
    players[0]
        .next_matching(|m| matches!(m, ServerMessage::DrawingPhaseStarted { .. }))
        .await;

    // Nobody finishes; the 80s wall-clock deadline is the only trigger
    tokio::time::advance(Duration::from_secs(81)).await;

    let message = players[0]
        .next_matching(|m| matches!(m, ServerMessage::GuessingPhaseStarted { .. }))
        .await;
    if let ServerMessage::GuessingPhaseStarted {
        guessing_index,
        total_targets,
        ..
    } = message
    {
        assert_eq!(guessing_index, 1);
        assert_eq!(total_targets, 2);
    }

    assert_eq!(rig.manager.phase(&code).await, Some(GamePhase::Guessing));
}

#[tokio::test(start_paused = true)]
async fn test_completion_advance_makes_drawing_deadline_stale() {
    let rig = TestRig::new(SessionSettings::default());
    let (code, mut players) = rig.setup_room(&["Alice", "Bob"]).await;
    rig.manager.start_game(&code, players[0].id).await.unwrap();

    // Completion wins the race against the drawing deadline
    for player_id in [players[0].id, players[1].id] {
        rig.manager
            .command(&code, SessionCommand::FinishDrawing { player: player_id })
            .await
            .unwrap();
    }

    players[0]
        .next_matching(|m| matches!(m, ServerMessage::GuessingPhaseStarted { .. }))
        .await;

    // Push past the original drawing deadline; the 20s guessing deadline
    // fires along the way and settles the first target
    tokio::time::advance(Duration::from_secs(100)).await;

    players[0]
        .next_matching(|m| matches!(m, ServerMessage::GuessingEnded { .. }))
        .await;

    // The late drawing deadline produced no observable change: no second
    // drawing phase, no repeated target intro
    let stray = players[0].drain_matching(|m| {
        matches!(
            m,
            ServerMessage::DrawingPhaseStarted { .. } | ServerMessage::GuessingPhaseStarted { .. }
        )
    });
    assert!(stray.is_empty(), "stale deadline leaked events: {stray:?}");
    assert_eq!(rig.manager.phase(&code).await, Some(GamePhase::Showing));
}

#[tokio::test(start_paused = true)]
async fn test_guessing_deadline_settles_with_abstainers() {
    let rig = TestRig::new(SessionSettings::default());
    let (code, mut players) = rig.setup_room(&["Alice", "Bob", "Carol"]).await;
    rig.manager.start_game(&code, players[0].id).await.unwrap();

    for id in [players[0].id, players[1].id, players[2].id] {
        rig.manager
            .command(&code, SessionCommand::FinishDrawing { player: id })
            .await
            .unwrap();
    }
    players[0]
        .next_matching(|m| matches!(m, ServerMessage::GuessingPhaseStarted { .. }))
        .await;

    // Nobody guesses; the per-target deadline settles the drawing
    tokio::time::advance(Duration::from_secs(21)).await;

    let ended = players[0]
        .next_matching(|m| matches!(m, ServerMessage::GuessingEnded { .. }))
        .await;
    if let ServerMessage::GuessingEnded {
        results,
        correct_answer,
        correct_word,
        ..
    } = ended
    {
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.did_not_guess));
        assert_eq!(correct_word, format!("word{correct_answer}"));
    }
}

#[tokio::test(start_paused = true)]
async fn test_all_guessed_settles_before_deadline() {
    let rig = TestRig::new(SessionSettings::default());
    let (code, mut players) = rig.setup_room(&["Alice", "Bob"]).await;
    rig.manager.start_game(&code, players[0].id).await.unwrap();

    for id in [players[0].id, players[1].id] {
        rig.manager
            .command(&code, SessionCommand::FinishDrawing { player: id })
            .await
            .unwrap();
    }

    let intro = players[0]
        .next_matching(|m| matches!(m, ServerMessage::GuessingPhaseStarted { .. }))
        .await;
    let target = match intro {
        ServerMessage::GuessingPhaseStarted {
            target_player_id, ..
        } => target_player_id,
        _ => unreachable!(),
    };

    let guesser_index = if players[0].id == target { 1 } else { 0 };
    let guesser = players[guesser_index].id;
    rig.manager
        .command(
            &code,
            SessionCommand::SubmitGuess {
                player: guesser,
                number: 4,
            },
        )
        .await
        .unwrap();

    // The lone eligible guesser completes the set; no deadline needed
    players[guesser_index]
        .next_matching(|m| matches!(m, ServerMessage::GuessSubmitted { .. }))
        .await;
    players[0]
        .next_matching(|m| matches!(m, ServerMessage::GuessingEnded { .. }))
        .await;
    assert_eq!(rig.manager.phase(&code).await, Some(GamePhase::Showing));
}

#[tokio::test(start_paused = true)]
async fn test_departing_target_resolves_round() {
    let rig = TestRig::new(SessionSettings::default());
    let (code, mut players) = rig.setup_room(&["Alice", "Bob", "Carol"]).await;
    rig.manager.start_game(&code, players[0].id).await.unwrap();

    for id in [players[0].id, players[1].id, players[2].id] {
        rig.manager
            .command(&code, SessionCommand::FinishDrawing { player: id })
            .await
            .unwrap();
    }

    let intro = players[0]
        .next_matching(|m| matches!(m, ServerMessage::GuessingPhaseStarted { .. }))
        .await;
    let target = match intro {
        ServerMessage::GuessingPhaseStarted {
            target_player_id, ..
        } => target_player_id,
        _ => unreachable!(),
    };

    rig.manager
        .command(&code, SessionCommand::PlayerLeft { player: target })
        .await
        .unwrap();

    let observer_index = if players[0].id == target { 1 } else { 0 };
    let ended = players[observer_index]
        .next_matching(|m| matches!(m, ServerMessage::GuessingEnded { .. }))
        .await;
    if let ServerMessage::GuessingEnded {
        target_player_id, ..
    } = ended
    {
        assert_eq!(target_player_id, target);
    }
}

#[tokio::test(start_paused = true)]
async fn test_full_game_emits_final_rankings() {
    let rig = TestRig::new(short_settings());
    let (code, mut players) = rig.setup_room(&["Alice", "Bob"]).await;
    let host = players[0].id;
    rig.manager.start_game(&code, host).await.unwrap();

    for id in [players[0].id, players[1].id] {
        rig.manager
            .command(&code, SessionCommand::FinishDrawing { player: id })
            .await
            .unwrap();
    }

    for _ in 0..2 {
        let intro = players[0]
            .next_matching(|m| matches!(m, ServerMessage::GuessingPhaseStarted { .. }))
            .await;
        let target = match intro {
            ServerMessage::GuessingPhaseStarted {
                target_player_id, ..
            } => target_player_id,
            _ => unreachable!(),
        };
        let guesser = if players[0].id == target {
            players[1].id
        } else {
            players[0].id
        };

        rig.manager
            .command(
                &code,
                SessionCommand::SubmitGuess {
                    player: guesser,
                    number: 2,
                },
            )
            .await
            .unwrap();
        players[0]
            .next_matching(|m| matches!(m, ServerMessage::GuessingEnded { .. }))
            .await;

        rig.manager
            .command(&code, SessionCommand::NextGuessing { issuer: host })
            .await
            .unwrap();
    }

    let round_ended = players[0]
        .next_matching(|m| matches!(m, ServerMessage::RoundEnded { .. }))
        .await;
    if let ServerMessage::RoundEnded {
        round, is_game_end, ..
    } = round_ended
    {
        assert_eq!(round, 1);
        assert!(is_game_end);
    }

    let game_ended = players[1]
        .next_matching(|m| matches!(m, ServerMessage::GameEnded { .. }))
        .await;
    if let ServerMessage::GameEnded { rankings } = game_ended {
        assert_eq!(rankings.len(), 2);
        assert!(rankings[0].total_score >= rankings[1].total_score);
        assert_eq!(rankings[0].rank, 1);
    }
}

#[tokio::test(start_paused = true)]
async fn test_commands_without_session_are_rejected() {
    let rig = TestRig::new(SessionSettings::default());
    let (code, players) = rig.setup_room(&["Alice", "Bob"]).await;

    let result = rig
        .manager
        .command(
            &code,
            SessionCommand::FinishDrawing {
                player: players[0].id,
            },
        )
        .await;
    assert!(result.unwrap_err().contains("not started"));
}

#[tokio::test(start_paused = true)]
async fn test_end_session_tears_down_actor() {
    let rig = TestRig::new(SessionSettings::default());
    let (code, players) = rig.setup_room(&["Alice", "Bob"]).await;
    rig.manager.start_game(&code, players[0].id).await.unwrap();
    assert_eq!(rig.manager.active_session_count().await, 1);

    rig.manager.end_session(&code).await;

    // Give the actor a chance to drain its mailbox
    tokio::task::yield_now().await;
    assert!(rig.manager.phase(&code).await.is_none());

    let result = rig
        .manager
        .command(
            &code,
            SessionCommand::FinishDrawing {
                player: players[0].id,
            },
        )
        .await;
    assert!(result.is_err());
}
