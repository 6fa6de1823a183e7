use anyhow::{Context, Result};
use log::info;

use super::{LeagueStore, WeightStore};
use crate::database::{self, DbConn, DbPool};
use crate::domain::{Match, NewMatch, Player, PlayerId};
use crate::errors::{storage_context, with_storage_context};
use crate::prediction::ModelWeights;

/// League and weight storage backed by a SQLite connection pool
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    /// Wraps the pool and makes sure the schema exists
    pub fn new(pool: DbPool) -> Result<Self> {
        let store = Self { pool };
        let conn = store.connection("open database")?;
        database::setup::ensure_schema(&conn)?;
        Ok(store)
    }

    pub fn open(database_path: &str) -> Result<Self> {
        info!("Opening database {}", database_path);
        Self::new(database::create_pool(database_path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::new(database::create_memory_pool()?)
    }

    fn connection(&self, operation: &str) -> Result<DbConn> {
        database::get_connection(&self.pool).context(storage_context(operation, "connection"))
    }
}

impl LeagueStore for SqliteStore {
    fn players(&self) -> Result<Vec<Player>> {
        let conn = self.connection("list players")?;
        database::players::list_all(&conn).context(storage_context("list", "players"))
    }

    fn player(&self, id: PlayerId) -> Result<Option<Player>> {
        let conn = self.connection("load player")?;
        database::players::find_by_id(&conn, id).with_context(|| storage_context("load player", &id.to_string()))
    }

    fn add_player(&self, name: &str, base_rating: f64) -> Result<Player> {
        let conn = self.connection("add player")?;
        database::players::insert_player(&conn, name, base_rating).context(storage_context("add player", name))
    }

    fn matches(&self) -> Result<Vec<Match>> {
        let conn = self.connection("list matches")?;
        database::matches::list_all(&conn).context(storage_context("list", "matches"))
    }

    fn record_match(&self, new_match: &NewMatch, player1: &Player, player2: &Player) -> Result<Match> {
        let mut conn = self.connection("record match")?;
        let tx = with_storage_context(conn.transaction(), "begin", "match transaction")?;

        let stored = database::matches::insert_match(&tx, new_match)?;
        database::players::update_statistics(&tx, player1)?;
        database::players::update_statistics(&tx, player2)?;

        with_storage_context(tx.commit(), "commit", "match transaction")?;
        Ok(stored)
    }

    fn save_players(&self, players: &[Player]) -> Result<()> {
        let mut conn = self.connection("save players")?;
        let tx = with_storage_context(conn.transaction(), "begin", "player transaction")?;

        for player in players {
            database::players::update_statistics(&tx, player)?;
        }

        with_storage_context(tx.commit(), "commit", "player transaction")?;
        info!("Saved statistics of {} players", players.len());
        Ok(())
    }
}

impl WeightStore for SqliteStore {
    fn load_weights(&self, model_name: &str) -> Result<Option<ModelWeights>> {
        let conn = self.connection("load weights")?;
        database::weights::find_by_model(&conn, model_name).context(storage_context("load weights", model_name))
    }

    fn save_weights(&self, weights: &ModelWeights) -> Result<()> {
        let conn = self.connection("save weights")?;
        database::weights::upsert_weights(&conn, weights)
            .context(storage_context("save weights", &weights.model_name))
    }
}
