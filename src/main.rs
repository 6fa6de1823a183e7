use anyhow::Result;

use table_tennis_ranking::cli::Command;
use table_tennis_ranking::{
    handle_add_match, handle_add_player, handle_completions, handle_history, handle_players,
    handle_predict, handle_recalculate, handle_serve, handle_train, interpret,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Serve { port } => handle_serve(*port),
        Command::AddPlayer { name } => handle_add_player(name),
        Command::AddMatch {
            player1,
            player2,
            score1,
            score2,
        } => handle_add_match(*player1, *player2, *score1, *score2),
        Command::Recalculate { all_time } => handle_recalculate(*all_time),
        Command::Players => handle_players(),
        Command::History { player, all_time } => handle_history(*player, *all_time),
        Command::Predict { player1, player2 } => handle_predict(*player1, *player2),
        Command::Train => handle_train(),
        Command::Completions { shell } => handle_completions(*shell),
    }
}
