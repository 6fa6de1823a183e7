use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use crate::domain::{Match, NewMatch};

const MATCH_COLUMNS: &str = "id, player1_id, player2_id, score1, score2, winner_id, played_at";

pub fn insert_match(conn: &Connection, new_match: &NewMatch) -> Result<Match> {
    let sql = format!(
        "INSERT INTO matches (player1_id, player2_id, score1, score2, winner_id, played_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING {}",
        MATCH_COLUMNS
    );

    conn.query_row(
        &sql,
        params![
            new_match.player1_id,
            new_match.player2_id,
            new_match.score1,
            new_match.score2,
            new_match.winner_id,
            new_match.played_at
        ],
        parse_match_row,
    )
    .context("Failed to insert match")
}

fn parse_match_row(row: &rusqlite::Row) -> rusqlite::Result<Match> {
    Ok(Match {
        id: row.get(0)?,
        player1_id: row.get(1)?,
        player2_id: row.get(2)?,
        score1: row.get(3)?,
        score2: row.get(4)?,
        winner_id: row.get(5)?,
        played_at: row.get(6)?,
    })
}

/// Every recorded match, oldest first
pub fn list_all(conn: &Connection) -> Result<Vec<Match>> {
    let sql = format!("SELECT {} FROM matches ORDER BY played_at, id", MATCH_COLUMNS);

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], parse_match_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}
