pub mod api;
pub mod cli;
pub mod config;
pub mod database;
pub mod display;
pub mod domain;
pub mod errors;
pub mod prediction;
pub mod rating;
pub mod services;
pub mod store;

use anyhow::Result;
use chrono::Utc;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use cli::Cli;

use crate::cli::Command;
use crate::config::AppConfig;
use crate::domain::{NewMatch, PlayerId};
use crate::errors::EngineError;
use crate::rating::RankingWindow;
use crate::services::{LeagueService, ServerService};
use crate::store::{LeagueStore, SqliteStore};

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

fn open_league(config: &AppConfig) -> Result<LeagueService<SqliteStore>> {
    let store = SqliteStore::open(&config.database_path)?;
    Ok(LeagueService::new(store, config))
}

fn window(all_time: bool) -> RankingWindow {
    if all_time {
        RankingWindow::unbounded()
    } else {
        RankingWindow::current_month()
    }
}

pub fn handle_serve(port: u16) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::from_env();
        let service = ServerService::new(port, config);
        service.run().await
    })
}

pub fn handle_add_player(name: &str) -> Result<()> {
    let league = open_league(&AppConfig::from_env())?;
    let player = league.add_player(name)?;
    println!("Added {} with id {} at {:.2}", player.name, player.id, player.rating);
    Ok(())
}

pub fn handle_add_match(player1: PlayerId, player2: PlayerId, score1: u32, score2: u32) -> Result<()> {
    let league = open_league(&AppConfig::from_env())?;
    let new_match = NewMatch::from_scores(player1, player2, score1, score2, Utc::now());
    let outcome = league.add_match(new_match)?;
    display::print_match_outcome(&outcome);
    Ok(())
}

pub fn handle_recalculate(all_time: bool) -> Result<()> {
    let league = open_league(&AppConfig::from_env())?;
    let recalculation = league.recalculate_rankings(&window(all_time))?;
    display::print_recalculation(&recalculation);
    Ok(())
}

pub fn handle_players() -> Result<()> {
    let league = open_league(&AppConfig::from_env())?;
    display::print_standings(&league.get_players()?);
    Ok(())
}

pub fn handle_history(player_id: PlayerId, all_time: bool) -> Result<()> {
    let config = AppConfig::from_env();
    let store = SqliteStore::open(&config.database_path)?;
    let player = store
        .player(player_id)?
        .ok_or(EngineError::UnknownPlayer(player_id))?;

    let league = LeagueService::new(store, &config);
    let history = league.get_player_rating_history(player_id, &window(all_time))?;
    display::print_history(&player, &history);
    Ok(())
}

pub fn handle_predict(player1_id: PlayerId, player2_id: PlayerId) -> Result<()> {
    let config = AppConfig::from_env();
    let store = SqliteStore::open(&config.database_path)?;
    let league = LeagueService::new(store.clone(), &config);

    let prediction = league.predict(player1_id, player2_id)?;
    let player1 = store.player(player1_id)?.ok_or(EngineError::UnknownPlayer(player1_id))?;
    let player2 = store.player(player2_id)?.ok_or(EngineError::UnknownPlayer(player2_id))?;
    display::print_prediction(&prediction, &player1, &player2);
    Ok(())
}

pub fn handle_train() -> Result<()> {
    let league = open_league(&AppConfig::from_env())?;
    let report = league.train_model()?;
    display::print_training_report(&report);
    Ok(())
}

pub fn handle_completions(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}
