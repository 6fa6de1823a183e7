use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::prediction::{ModelWeights, NamedWeight};

pub fn upsert_weights(conn: &Connection, record: &ModelWeights) -> Result<()> {
    let sql = "INSERT INTO model_weights (model_name, schema, bias, weights, last_updated) VALUES (?1, ?2, ?3, ?4, ?5)
               ON CONFLICT(model_name) DO UPDATE SET schema = excluded.schema, bias = excluded.bias, weights = excluded.weights, last_updated = excluded.last_updated";

    let weights_json =
        serde_json::to_string(&record.weights).context("Failed to serialize model weights")?;

    conn.execute(
        sql,
        params![
            record.model_name,
            record.schema,
            record.bias,
            weights_json,
            record.last_updated
        ],
    )
    .with_context(|| format!("Failed to save weights for model '{}'", record.model_name))?;

    Ok(())
}

pub fn find_by_model(conn: &Connection, model_name: &str) -> Result<Option<ModelWeights>> {
    let sql = "SELECT model_name, schema, bias, weights, last_updated FROM model_weights WHERE model_name = ?1";

    let row = conn
        .query_row(sql, params![model_name], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, DateTime<Utc>>(4)?,
            ))
        })
        .optional()
        .with_context(|| format!("Failed to query weights for model '{}'", model_name))?;

    let Some((model_name, schema, bias, weights_json, last_updated)) = row else {
        return Ok(None);
    };

    let weights: Vec<NamedWeight> = serde_json::from_str(&weights_json)
        .with_context(|| format!("Failed to parse stored weights for model '{}'", model_name))?;

    Ok(Some(ModelWeights {
        model_name,
        schema,
        bias,
        weights,
        last_updated,
    }))
}
