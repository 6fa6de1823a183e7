use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::{Player, PlayerId};

const PLAYER_COLUMNS: &str = "id, name, rating, wins, losses, set_difference";

pub fn insert_player(conn: &Connection, name: &str, rating: f64) -> Result<Player> {
    let sql = format!(
        "INSERT INTO players (name, rating) VALUES (?1, ?2) RETURNING {}",
        PLAYER_COLUMNS
    );

    conn.query_row(&sql, params![name, rating], parse_player_row)
        .with_context(|| format!("Failed to insert player '{}'", name))
}

fn parse_player_row(row: &rusqlite::Row) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(0)?,
        name: row.get(1)?,
        rating: row.get(2)?,
        wins: row.get(3)?,
        losses: row.get(4)?,
        set_difference: row.get(5)?,
    })
}

pub fn find_by_id(conn: &Connection, id: PlayerId) -> Result<Option<Player>> {
    let sql = format!("SELECT {} FROM players WHERE id = ?1", PLAYER_COLUMNS);

    conn.query_row(&sql, params![id], parse_player_row)
        .optional()
        .context("Failed to query player by id")
}

pub fn list_all(conn: &Connection) -> Result<Vec<Player>> {
    let sql = format!("SELECT {} FROM players ORDER BY id", PLAYER_COLUMNS);

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], parse_player_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn update_statistics(conn: &Connection, player: &Player) -> Result<()> {
    let sql = "UPDATE players SET rating = ?1, wins = ?2, losses = ?3, set_difference = ?4 WHERE id = ?5";

    let updated = conn
        .execute(
            sql,
            params![player.rating, player.wins, player.losses, player.set_difference, player.id],
        )
        .with_context(|| format!("Failed to update statistics of player {}", player.id))?;

    if updated == 0 {
        anyhow::bail!("Player {} does not exist", player.id);
    }
    Ok(())
}
