use colored::*;

use crate::domain::{Player, RatingPoint};
use crate::prediction::TrainingReport;
use crate::rating::{DataQualityIssue, Recalculation};
use crate::services::{AddMatchOutcome, ModelUpdate, Prediction};

pub fn print_standings(players: &[Player]) {
    println!("\n{}", "League standings".bold().cyan());
    println!("{}", "=".repeat(60).cyan());

    if players.is_empty() {
        println!("{}", "No players registered yet".yellow());
        return;
    }

    let mut ranked: Vec<&Player> = players.iter().collect();
    ranked.sort_by(|a, b| b.rating.total_cmp(&a.rating));

    println!(
        "{:>4}  {:<24} {:>9} {:>5} {:>5} {:>6}",
        "#", "Player", "Rating", "W", "L", "Sets"
    );
    for (idx, player) in ranked.iter().enumerate() {
        println!(
            "{:>4}  {:<24} {:>9.2} {:>5} {:>5} {:>+6}",
            idx + 1,
            format!("{} ({})", player.name, player.id),
            player.rating,
            player.wins,
            player.losses,
            player.set_difference
        );
    }
}

pub fn print_match_outcome(outcome: &AddMatchOutcome) {
    let game = &outcome.game;
    println!(
        "{} {} {}:{} {}",
        format!("Match {} recorded:", game.id).bold().green(),
        outcome.player1.name,
        game.score1,
        game.score2,
        outcome.player2.name
    );
    print_rating_change(&outcome.player1.name, outcome.ratings_before.0, outcome.player1.rating);
    print_rating_change(&outcome.player2.name, outcome.ratings_before.1, outcome.player2.rating);

    match &outcome.model_update {
        ModelUpdate::Saved { error } => println!("Model updated (error {:.4})", error),
        ModelUpdate::Failed { reason } => {
            println!("{} {}", "Model not updated:".yellow(), reason)
        }
    }
}

fn print_rating_change(name: &str, before: f64, after: f64) {
    let delta = after - before;
    let delta = if delta > 0.0 {
        format!("{:+.2}", delta).green()
    } else if delta < 0.0 {
        format!("{:+.2}", delta).red()
    } else {
        format!("{:+.2}", delta).normal()
    };
    println!("  {:<24} {:>9.2} -> {:>9.2} ({})", name, before, after, delta);
}

pub fn print_recalculation(recalculation: &Recalculation) {
    println!(
        "{}",
        format!("Replayed {} matches", recalculation.replayed).bold().green()
    );
    for issue in &recalculation.issues {
        let text = match issue {
            DataQualityIssue::WinnerDisagreesWithScore {
                match_id,
                recorded_winner,
                winner_by_score,
            } => format!(
                "match {}: recorded winner {} but the score says {}",
                match_id, recorded_winner, winner_by_score
            ),
            DataQualityIssue::UnknownPlayer { match_id, player_id } => {
                format!("match {}: unknown player {}, skipped", match_id, player_id)
            }
        };
        println!("{} {}", "warning:".yellow(), text);
    }
    print_standings(&recalculation.players);
}

pub fn print_history(player: &Player, history: &[RatingPoint]) {
    println!("\n{}", format!("Rating history of {}", player.name).bold().cyan());
    for point in history {
        println!("{:>4}  {:>9.2}", point.match_number, point.rating);
    }
}

pub fn print_prediction(prediction: &Prediction, player1: &Player, player2: &Player) {
    println!(
        "\n{}",
        format!("{} vs {}", player1.name, player2.name).bold().cyan()
    );
    println!(
        "Elo:   {:>6.1}% win chance for {}",
        prediction.elo_probability * 100.0,
        player1.name
    );
    match prediction.model_probability {
        Some(p) => println!("Model: {:>6.1}% win chance for {}", p * 100.0, player1.name),
        None => println!("Model: {}", "unavailable".yellow()),
    }
}

pub fn print_training_report(report: &TrainingReport) {
    let status = if report.converged {
        "converged".green()
    } else {
        "stopped at epoch cap".yellow()
    };
    println!(
        "Training {} after {} epochs (total error {:.4})",
        status, report.epochs_run, report.final_error
    );
}
