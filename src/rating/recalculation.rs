use std::collections::HashMap;

use log::{info, warn};
use serde::Serialize;

use super::elo::{apply_result, EloRatingEngine};
use super::window::RankingWindow;
use crate::config::RatingSettings;
use crate::domain::{Match, MatchId, Player, PlayerId, RatingPoint};

/// Data-integrity findings reported by a replay. None of them abort the replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum DataQualityIssue {
    /// Recorded winner contradicts the scoreline; the scoreline was used
    WinnerDisagreesWithScore {
        match_id: MatchId,
        recorded_winner: PlayerId,
        winner_by_score: PlayerId,
    },
    /// Match references a player that is not in the league; the match was skipped
    UnknownPlayer { match_id: MatchId, player_id: PlayerId },
}

/// Result of rebuilding the standings for one window
#[derive(Debug, Clone)]
pub struct Recalculation {
    pub players: Vec<Player>,
    pub replayed: usize,
    pub issues: Vec<DataQualityIssue>,
}

/// Rebuilds player standings by replaying a match window from base ratings
#[derive(Debug, Clone)]
pub struct RankingRecalculator {
    engine: EloRatingEngine,
    base_rating: f64,
}

impl Default for RankingRecalculator {
    fn default() -> Self {
        Self::new(&RatingSettings::default())
    }
}

impl RankingRecalculator {
    pub fn new(settings: &RatingSettings) -> Self {
        Self {
            engine: EloRatingEngine::new(settings),
            base_rating: settings.base_rating,
        }
    }

    pub fn engine(&self) -> &EloRatingEngine {
        &self.engine
    }

    pub fn recalculate(
        &self,
        mut players: Vec<Player>,
        matches: &[Match],
        window: &RankingWindow,
    ) -> Recalculation {
        let replay = chronological(matches, window);
        info!(
            "Replaying {} of {} matches for {} players",
            replay.len(),
            matches.len(),
            players.len()
        );

        for player in players.iter_mut() {
            player.reset(self.base_rating);
        }

        let index: HashMap<PlayerId, usize> = players
            .iter()
            .enumerate()
            .map(|(idx, player)| (player.id, idx))
            .collect();

        let mut issues = Vec::new();
        let mut replayed = 0;

        for game in replay {
            let (Some(&i), Some(&j)) = (index.get(&game.player1_id), index.get(&game.player2_id)) else {
                let player_id = if index.contains_key(&game.player1_id) {
                    game.player2_id
                } else {
                    game.player1_id
                };
                warn!("Skipping match {}: unknown player {}", game.id, player_id);
                issues.push(DataQualityIssue::UnknownPlayer {
                    match_id: game.id,
                    player_id,
                });
                continue;
            };

            if !game.winner_agrees_with_score() {
                warn!(
                    "Match {} records winner {} but the score {}:{} says {}",
                    game.id,
                    game.winner_id,
                    game.score1,
                    game.score2,
                    game.winner_by_score()
                );
                issues.push(DataQualityIssue::WinnerDisagreesWithScore {
                    match_id: game.id,
                    recorded_winner: game.winner_id,
                    winner_by_score: game.winner_by_score(),
                });
            }

            if let Some((player1, player2)) = pair_mut(&mut players, i, j) {
                apply_result(&self.engine, player1, player2, game);
                replayed += 1;
            }
        }

        Recalculation {
            players,
            replayed,
            issues,
        }
    }

    /// Rating curve of one player over the window.
    ///
    /// Starts at `(0, base)` and adds a point after every match the player took
    /// part in. Opponents missing from the league start at the base rating.
    pub fn rating_history(
        &self,
        player_id: PlayerId,
        matches: &[Match],
        window: &RankingWindow,
    ) -> Vec<RatingPoint> {
        let mut ratings: HashMap<PlayerId, f64> = HashMap::new();
        let mut history = vec![RatingPoint {
            match_number: 0,
            rating: self.base_rating,
        }];

        for game in chronological(matches, window) {
            let rating1 = *ratings.get(&game.player1_id).unwrap_or(&self.base_rating);
            let rating2 = *ratings.get(&game.player2_id).unwrap_or(&self.base_rating);

            let (new1, new2) = self
                .engine
                .compute_new_ratings(rating1, rating2, game.score1, game.score2);
            ratings.insert(game.player1_id, new1);
            ratings.insert(game.player2_id, new2);

            if game.involves(player_id) {
                history.push(RatingPoint {
                    match_number: history.len(),
                    rating: ratings[&player_id],
                });
            }
        }

        history
    }
}

/// Matches inside the window, oldest first. Equal timestamps keep input order.
fn chronological<'a>(matches: &'a [Match], window: &RankingWindow) -> Vec<&'a Match> {
    let mut selected: Vec<&Match> = matches
        .iter()
        .filter(|game| window.contains(game.played_at))
        .collect();
    selected.sort_by_key(|game| game.played_at);
    selected
}

fn pair_mut(players: &mut [Player], i: usize, j: usize) -> Option<(&mut Player, &mut Player)> {
    if i == j {
        return None;
    }
    if i < j {
        let (left, right) = players.split_at_mut(j);
        Some((&mut left[i], &mut right[0]))
    } else {
        let (left, right) = players.split_at_mut(i);
        Some((&mut right[0], &mut left[j]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewMatch;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    fn game(id: i64, p1: PlayerId, p2: PlayerId, s1: u32, s2: u32, minutes: i64) -> Match {
        NewMatch::from_scores(p1, p2, s1, s2, start() + Duration::minutes(minutes)).into_match(id)
    }

    fn roster() -> Vec<Player> {
        vec![
            Player::new(1, "Anna", 1000.0),
            Player::new(2, "Ben", 1000.0),
            Player::new(3, "Carla", 1000.0),
        ]
    }

    fn june() -> RankingWindow {
        RankingWindow::month_of(start())
    }

    #[test]
    fn test_single_match_replay() {
        let recalculator = RankingRecalculator::default();
        let result = recalculator.recalculate(roster(), &[game(1, 1, 2, 2, 0, 0)], &june());

        assert_eq!(result.replayed, 1);
        assert_eq!(result.players[0].rating, 1016.0);
        assert_eq!(result.players[1].rating, 984.0);
        assert_eq!(result.players[2].rating, 1000.0);
        assert_eq!(result.players[0].wins, 1);
        assert_eq!(result.players[1].losses, 1);
        assert_eq!(result.players[0].set_difference, 2);
        assert_eq!(result.players[1].set_difference, -2);
    }

    #[test]
    fn test_resets_stale_statistics() {
        let mut players = roster();
        players[0].rating = 1450.0;
        players[0].wins = 40;
        players[2].losses = 12;
        players[2].set_difference = -30;

        let result = RankingRecalculator::default().recalculate(players, &[], &june());

        for player in &result.players {
            assert_eq!(player.rating, 1000.0);
            assert_eq!(player.games(), 0);
            assert_eq!(player.set_difference, 0);
        }
    }

    #[test]
    fn test_replays_in_chronological_order() {
        // Stored out of order; path dependence makes the order observable
        let matches = vec![
            game(3, 3, 1, 2, 0, 30),
            game(1, 1, 2, 2, 0, 0),
            game(2, 2, 3, 2, 1, 10),
        ];
        let mut sorted = matches.clone();
        sorted.sort_by_key(|m| m.played_at);

        let recalculator = RankingRecalculator::default();
        let shuffled = recalculator.recalculate(roster(), &matches, &june());
        let ordered = recalculator.recalculate(roster(), &sorted, &june());

        assert_eq!(shuffled.players, ordered.players);
    }

    #[test]
    fn test_replay_equals_incremental_updates() {
        let matches = vec![
            game(1, 1, 2, 2, 0, 0),
            game(2, 2, 3, 2, 1, 5),
            game(3, 3, 1, 3, 2, 9),
            game(4, 1, 2, 1, 2, 14),
            game(5, 2, 1, 0, 2, 20),
            game(6, 1, 3, 2, 1, 31),
        ];

        let recalculator = RankingRecalculator::default();
        let rebuilt = recalculator.recalculate(roster(), &matches, &june());

        let mut incremental = roster();
        for m in &matches {
            let i = (m.player1_id - 1) as usize;
            let j = (m.player2_id - 1) as usize;
            let (p1, p2) = pair_mut(&mut incremental, i, j).unwrap();
            apply_result(recalculator.engine(), p1, p2, m);
        }

        assert_eq!(rebuilt.players, incremental);
        assert_eq!(rebuilt.replayed, matches.len());
    }

    #[test]
    fn test_matches_outside_window_ignored() {
        let mut previous_month = game(1, 1, 2, 2, 0, 0);
        previous_month.played_at = start() - Duration::days(3);
        let next_month = {
            let mut m = game(2, 1, 2, 0, 2, 0);
            m.played_at = june().end;
            m
        };

        let result = RankingRecalculator::default().recalculate(
            roster(),
            &[previous_month, next_month, game(3, 2, 3, 2, 0, 1)],
            &june(),
        );

        assert_eq!(result.replayed, 1);
        assert_eq!(result.players[0].rating, 1000.0);
        assert_eq!(result.players[1].rating, 1016.0);
    }

    #[test]
    fn test_score_is_ground_truth_for_wins() {
        let mut disputed = game(1, 1, 2, 2, 1, 0);
        disputed.winner_id = 2;

        let result = RankingRecalculator::default().recalculate(roster(), &[disputed], &june());

        assert_eq!(result.players[0].wins, 1);
        assert_eq!(result.players[1].losses, 1);
        assert_eq!(
            result.issues,
            vec![DataQualityIssue::WinnerDisagreesWithScore {
                match_id: 1,
                recorded_winner: 2,
                winner_by_score: 1,
            }]
        );
    }

    #[test]
    fn test_unknown_player_skipped() {
        let result = RankingRecalculator::default().recalculate(
            roster(),
            &[game(1, 1, 9, 2, 0, 0), game(2, 1, 2, 2, 0, 1)],
            &june(),
        );

        assert_eq!(result.replayed, 1);
        assert_eq!(result.players[0].rating, 1016.0);
        assert_eq!(
            result.issues,
            vec![DataQualityIssue::UnknownPlayer { match_id: 1, player_id: 9 }]
        );
    }

    #[test]
    fn test_rating_history_tracks_player_matches() {
        let matches = vec![
            game(1, 1, 2, 2, 0, 0),
            game(2, 2, 3, 2, 0, 5),
            game(3, 3, 1, 2, 1, 9),
        ];

        let history = RankingRecalculator::default().rating_history(1, &matches, &june());

        assert_eq!(history.len(), 3);
        assert_eq!(history[0], RatingPoint { match_number: 0, rating: 1000.0 });
        assert_eq!(history[1], RatingPoint { match_number: 1, rating: 1016.0 });
        assert_eq!(history[2].match_number, 2);
        assert!(history[2].rating < 1016.0);
    }

    #[test]
    fn test_rating_history_of_idle_player() {
        let history = RankingRecalculator::default().rating_history(
            3,
            &[game(1, 1, 2, 2, 0, 0)],
            &june(),
        );
        assert_eq!(history, vec![RatingPoint { match_number: 0, rating: 1000.0 }]);
    }
}
