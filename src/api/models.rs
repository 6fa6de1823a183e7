use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{NewMatch, Player, PlayerId, RatingPoint};
use crate::prediction::TrainingReport;
use crate::rating::{DataQualityIssue, RankingWindow, Recalculation};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerListItem {
    pub rank: usize,
    pub player_id: PlayerId,
    pub name: String,
    pub rating: f64,
    pub wins: u32,
    pub losses: u32,
    pub set_difference: i64,
    pub games_played: u32,
}

impl PlayerListItem {
    /// Standings ordered by rating, best first. Equal ratings keep id order.
    pub fn standings(mut players: Vec<Player>) -> Vec<Self> {
        players.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        players
            .into_iter()
            .enumerate()
            .map(|(i, player)| PlayerListItem {
                rank: i + 1,
                player_id: player.id,
                games_played: player.games(),
                name: player.name,
                rating: player.rating,
                wins: player.wins,
                losses: player.losses,
                set_difference: player.set_difference,
            })
            .collect()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlayerRequest {
    pub name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchRequest {
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    pub score1: u32,
    pub score2: u32,
    /// Derived from the score when omitted
    pub winner_id: Option<PlayerId>,
    /// Defaults to the time of the request
    pub played_at: Option<DateTime<Utc>>,
}

impl CreateMatchRequest {
    pub fn into_new_match(self, now: DateTime<Utc>) -> NewMatch {
        let mut new_match = NewMatch::from_scores(
            self.player1_id,
            self.player2_id,
            self.score1,
            self.score2,
            self.played_at.unwrap_or(now),
        );
        if let Some(winner_id) = self.winner_id {
            new_match.winner_id = winner_id;
        }
        new_match
    }
}

/// Which matches a replay covers
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WindowParams {
    /// Replay every match instead of the current calendar month
    #[serde(default)]
    pub all_time: bool,
}

impl WindowParams {
    pub fn window(&self) -> RankingWindow {
        if self.all_time {
            RankingWindow::unbounded()
        } else {
            RankingWindow::current_month()
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecalculationResponse {
    pub replayed: usize,
    pub issues: Vec<DataQualityIssue>,
    pub players: Vec<PlayerListItem>,
}

impl From<Recalculation> for RecalculationResponse {
    fn from(recalculation: Recalculation) -> Self {
        Self {
            replayed: recalculation.replayed,
            issues: recalculation.issues,
            players: PlayerListItem::standings(recalculation.players),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingHistoryResponse {
    pub player_id: PlayerId,
    pub history: Vec<RatingPoint>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingResponse {
    pub epochs_run: usize,
    pub final_error: f64,
    pub converged: bool,
}

impl From<TrainingReport> for TrainingResponse {
    fn from(report: TrainingReport) -> Self {
        Self {
            epochs_run: report.epochs_run,
            final_error: report.final_error,
            converged: report.converged,
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
