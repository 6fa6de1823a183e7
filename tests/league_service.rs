use anyhow::{bail, Result};
use chrono::{DateTime, TimeZone, Utc};

use table_tennis_ranking::config::AppConfig;
use table_tennis_ranking::domain::{Match, NewMatch, Player, PlayerId};
use table_tennis_ranking::prediction::ModelWeights;
use table_tennis_ranking::rating::{DataQualityIssue, RankingWindow};
use table_tennis_ranking::services::{LeagueService, ModelUpdate};
use table_tennis_ranking::store::{LeagueStore, SqliteStore, WeightStore};

/// League storage that works, weight storage that does not
#[derive(Clone)]
struct BrokenWeights {
    inner: SqliteStore,
}

impl LeagueStore for BrokenWeights {
    fn players(&self) -> Result<Vec<Player>> {
        self.inner.players()
    }

    fn player(&self, id: PlayerId) -> Result<Option<Player>> {
        self.inner.player(id)
    }

    fn add_player(&self, name: &str, base_rating: f64) -> Result<Player> {
        self.inner.add_player(name, base_rating)
    }

    fn matches(&self) -> Result<Vec<Match>> {
        self.inner.matches()
    }

    fn record_match(&self, new_match: &NewMatch, player1: &Player, player2: &Player) -> Result<Match> {
        self.inner.record_match(new_match, player1, player2)
    }

    fn save_players(&self, players: &[Player]) -> Result<()> {
        self.inner.save_players(players)
    }
}

impl WeightStore for BrokenWeights {
    fn load_weights(&self, _model_name: &str) -> Result<Option<ModelWeights>> {
        bail!("Storage unavailable: weights table locked")
    }

    fn save_weights(&self, _weights: &ModelWeights) -> Result<()> {
        bail!("Storage unavailable: weights table locked")
    }
}

fn june(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap()
}

fn league_with_players(names: &[&str]) -> (LeagueService<SqliteStore>, SqliteStore, Vec<Player>) {
    let store = SqliteStore::in_memory().unwrap();
    let league = LeagueService::new(store.clone(), &AppConfig::new());
    let players = names.iter().map(|name| league.add_player(name).unwrap()).collect();
    (league, store, players)
}

#[test]
fn test_recalculation_reproduces_incremental_ratings() {
    let (league, _, players) = league_with_players(&["Anna", "Ben", "Carla"]);
    let (a, b, c) = (players[0].id, players[1].id, players[2].id);

    for new_match in [
        NewMatch::from_scores(a, b, 2, 0, june(3, 18)),
        NewMatch::from_scores(b, c, 2, 1, june(4, 18)),
        NewMatch::from_scores(c, a, 2, 1, june(5, 18)),
        NewMatch::from_scores(a, b, 1, 2, june(6, 18)),
    ] {
        league.add_match(new_match).unwrap();
    }
    let incremental = league.get_players().unwrap();

    let june_window = RankingWindow::month_of(june(15, 12));
    let recalculation = league.recalculate_rankings(&june_window).unwrap();

    assert_eq!(recalculation.replayed, 4);
    assert!(recalculation.issues.is_empty());
    assert_eq!(recalculation.players, incremental);
    assert_eq!(league.get_players().unwrap(), incremental);
}

#[test]
fn test_recalculation_only_counts_the_window() {
    let (league, _, players) = league_with_players(&["Anna", "Ben"]);
    let (a, b) = (players[0].id, players[1].id);

    league
        .add_match(NewMatch::from_scores(a, b, 2, 0, june(28, 20)))
        .unwrap();
    let july = Utc.with_ymd_and_hms(2024, 7, 2, 20, 0, 0).unwrap();
    league.add_match(NewMatch::from_scores(b, a, 2, 1, july)).unwrap();

    let recalculation = league
        .recalculate_rankings(&RankingWindow::month_of(july))
        .unwrap();

    assert_eq!(recalculation.replayed, 1);
    let anna = &recalculation.players[0];
    let ben = &recalculation.players[1];
    assert_eq!((anna.rating, ben.rating), (992.0, 1008.0));
    assert_eq!((anna.wins, anna.losses), (0, 1));
    assert_eq!((ben.set_difference, anna.set_difference), (1, -1));
}

#[test]
fn test_recalculation_flags_winner_that_contradicts_score() {
    let (league, _, players) = league_with_players(&["Anna", "Ben"]);
    let (a, b) = (players[0].id, players[1].id);

    let mut disputed = NewMatch::from_scores(a, b, 2, 1, june(10, 19));
    disputed.winner_id = b;
    let outcome = league.add_match(disputed).unwrap();

    // Standings follow the scoreline
    assert_eq!(outcome.player1.wins, 1);

    let recalculation = league
        .recalculate_rankings(&RankingWindow::unbounded())
        .unwrap();
    assert_eq!(
        recalculation.issues,
        vec![DataQualityIssue::WinnerDisagreesWithScore {
            match_id: outcome.game.id,
            recorded_winner: b,
            winner_by_score: a,
        }]
    );
    assert_eq!(recalculation.players[0].rating, 1008.0);
}

#[test]
fn test_rating_history_tracks_each_match() {
    let (league, _, players) = league_with_players(&["Anna", "Ben", "Carla"]);
    let (a, b, c) = (players[0].id, players[1].id, players[2].id);

    league.add_match(NewMatch::from_scores(a, b, 2, 0, june(1, 18))).unwrap();
    league.add_match(NewMatch::from_scores(b, c, 2, 0, june(2, 18))).unwrap();
    league.add_match(NewMatch::from_scores(b, a, 2, 1, june(3, 18))).unwrap();

    let history = league
        .get_player_rating_history(a, &RankingWindow::unbounded())
        .unwrap();

    let numbers: Vec<usize> = history.iter().map(|p| p.match_number).collect();
    assert_eq!(numbers, vec![0, 1, 2]);
    assert_eq!(history[0].rating, 1000.0);
    assert_eq!(history[1].rating, 1016.0);
    assert_eq!(history.last().unwrap().rating, league.get_players().unwrap()[0].rating);

    assert!(league
        .get_player_rating_history(99, &RankingWindow::unbounded())
        .is_err());
}

#[test]
fn test_weight_store_failure_keeps_match_and_elo() {
    let inner = SqliteStore::in_memory().unwrap();
    let league = LeagueService::new(BrokenWeights { inner: inner.clone() }, &AppConfig::new());
    let a = league.add_player("Anna").unwrap().id;
    let b = league.add_player("Ben").unwrap().id;

    let outcome = league
        .add_match(NewMatch::from_scores(a, b, 2, 0, june(7, 18)))
        .unwrap();
    assert!(matches!(outcome.model_update, ModelUpdate::Failed { .. }));
    assert_eq!(inner.matches().unwrap().len(), 1);
    assert_eq!(inner.player(a).unwrap().unwrap().rating, 1016.0);

    let prediction = league.predict(a, b).unwrap();
    assert!(prediction.elo_probability > 0.5);
    assert_eq!(prediction.model_probability, None);

    assert!(league.train_model().is_err());
}

#[test]
fn test_training_learns_from_history() {
    let (league, store, players) = league_with_players(&["Anna", "Ben"]);
    let (a, b) = (players[0].id, players[1].id);

    for day in 1..=6 {
        league
            .add_match(NewMatch::from_scores(a, b, 2, 0, june(day, 18)))
            .unwrap();
    }
    let before = league.predict(a, b).unwrap().model_probability.unwrap();

    let report = league.train_model().unwrap();
    assert!(report.epochs_run >= 1);
    assert!(store.load_weights("MatchPredictionModel").unwrap().is_some());

    let after = league.predict(a, b).unwrap().model_probability.unwrap();
    assert!(after > before);
    assert!(after > 0.5);
}

#[test]
fn test_online_updates_accumulate() {
    let (league, store, players) = league_with_players(&["Anna", "Ben"]);
    let (a, b) = (players[0].id, players[1].id);

    let first = league
        .add_match(NewMatch::from_scores(a, b, 2, 0, june(1, 18)))
        .unwrap();
    let first_weights = store.load_weights("MatchPredictionModel").unwrap().unwrap();

    let second = league
        .add_match(NewMatch::from_scores(a, b, 2, 1, june(2, 18)))
        .unwrap();
    let second_weights = store.load_weights("MatchPredictionModel").unwrap().unwrap();

    assert_eq!(first.model_update, ModelUpdate::Saved { error: 0.5 });
    let ModelUpdate::Saved { error } = second.model_update else {
        panic!("second update failed");
    };
    assert!(error < 0.5);
    assert!(second_weights.bias > first_weights.bias);
    assert_eq!(second_weights.schema, "extended-v1");
}
