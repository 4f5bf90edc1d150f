//! Decode SQLite rows into JSON objects keyed by column name.

use crate::config::{ColumnKind, EntitySchema};
use crate::error::AppError;
use serde_json::{Map, Number, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{ColumnIndex, Row};

pub fn row_to_json(row: &SqliteRow, entity: &EntitySchema) -> Result<Map<String, Value>, AppError> {
    let mut map = Map::new();
    for col in &entity.columns {
        map.insert(col.name.to_string(), cell_to_value(row, col.name, col.kind)?);
    }
    Ok(map)
}

pub fn cell_to_value<I>(row: &SqliteRow, index: I, kind: ColumnKind) -> Result<Value, AppError>
where
    I: ColumnIndex<SqliteRow>,
{
    let v = match kind {
        ColumnKind::Integer => row.try_get::<Option<i64>, _>(index)?.map(Value::from),
        ColumnKind::Real => row
            .try_get::<Option<f64>, _>(index)?
            .and_then(Number::from_f64)
            .map(Value::Number),
        ColumnKind::Text | ColumnKind::Timestamp => row.try_get::<Option<String>, _>(index)?.map(Value::String),
        ColumnKind::Json => match row.try_get::<Option<String>, _>(index)? {
            Some(text) => Some(serde_json::from_str(&text).map_err(|e| AppError::Decode(e.to_string()))?),
            None => None,
        },
    };
    Ok(v.unwrap_or(Value::Null))
}
