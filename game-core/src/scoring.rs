use game_types::{FinalRanking, Player, PlayerId, RoundStanding, TargetResult};

use crate::ledger::AcceptedGuess;

/// Points by correct-guess rank; everyone past the table earns the last entry.
const RANK_SCORES: [i32; 4] = [5, 3, 2, 1];
const WRONG_GUESS_PENALTY: i32 = -2;

pub struct ScoringEngine;

impl ScoringEngine {
    /// Settle one shown drawing. `guesses` must be in acceptance order;
    /// `abstained` lists eligible guessers with no recorded guess. Each
    /// result's `score` is the delta to apply to that guesser's round score.
    /// The target themselves never appears in the output.
    pub fn settle_target(
        guesses: &[AcceptedGuess],
        abstained: &[PlayerId],
        roster: &[Player],
    ) -> Vec<TargetResult> {
        let name_of = |id: PlayerId| -> (String, String) {
            roster
                .iter()
                .find(|p| p.id == id)
                .map(|p| (p.name.clone(), p.color.clone()))
                .unwrap_or_default()
        };

        let mut correct: Vec<&AcceptedGuess> = guesses.iter().filter(|g| g.is_correct).collect();
        // Stable sort: equal timestamps keep acceptance order
        correct.sort_by_key(|g| g.timestamp);

        let mut results = Vec::with_capacity(guesses.len() + abstained.len());

        for (index, guess) in correct.iter().enumerate() {
            let score = RANK_SCORES
                .get(index)
                .copied()
                .unwrap_or(RANK_SCORES[RANK_SCORES.len() - 1]);
            let (player_name, player_color) = name_of(guess.guesser_id);
            results.push(TargetResult {
                player_id: guess.guesser_id,
                player_name,
                player_color,
                guess_number: Some(guess.number),
                is_correct: true,
                score,
                rank: Some(index as u32 + 1),
                did_not_guess: false,
            });
        }

        for guess in guesses.iter().filter(|g| !g.is_correct) {
            let (player_name, player_color) = name_of(guess.guesser_id);
            results.push(TargetResult {
                player_id: guess.guesser_id,
                player_name,
                player_color,
                guess_number: Some(guess.number),
                is_correct: false,
                score: WRONG_GUESS_PENALTY,
                rank: None,
                did_not_guess: false,
            });
        }

        for &player_id in abstained {
            let (player_name, player_color) = name_of(player_id);
            results.push(TargetResult {
                player_id,
                player_name,
                player_color,
                guess_number: None,
                is_correct: false,
                score: 0,
                rank: None,
                did_not_guess: true,
            });
        }

        results
    }

    /// Order a round's standings for display, best round score first.
    pub fn round_standings(mut standings: Vec<RoundStanding>) -> Vec<RoundStanding> {
        standings.sort_by(|a, b| b.round_score.cmp(&a.round_score));
        standings
    }

    /// Dense competition ranking over total scores: tied players share a
    /// rank, the next distinct score takes its list position plus one.
    pub fn final_rankings<F>(roster: &[Player], total_score: F) -> Vec<FinalRanking>
    where
        F: Fn(PlayerId) -> i32,
    {
        let mut rankings: Vec<FinalRanking> = roster
            .iter()
            .map(|p| FinalRanking {
                player_id: p.id,
                player_name: p.name.clone(),
                color: p.color.clone(),
                total_score: total_score(p.id),
                rank: 1,
            })
            .collect();

        rankings.sort_by(|a, b| b.total_score.cmp(&a.total_score));

        let mut rank = 1;
        for index in 0..rankings.len() {
            if index > 0 && rankings[index].total_score < rankings[index - 1].total_score {
                rank = index as u32 + 1;
            }
            rankings[index].rank = rank;
        }

        rankings
    }
}
