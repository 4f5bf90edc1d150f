//! Convert serde_json::Value to values sqlx can bind, guided by the column kind.

use crate::config::{ColumnDef, ColumnKind};
use crate::error::AppError;
use serde_json::Value;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments};

/// A value that can be bound to a SQLite query.
#[derive(Clone, Debug, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    /// Convert a request value for `column`. Type mismatches are validation errors.
    pub fn for_column(column: &ColumnDef, v: &Value) -> Result<Self, AppError> {
        if v.is_null() {
            if column.nullable {
                return Ok(SqlValue::Null);
            }
            return Err(AppError::Validation(format!("{} must not be null", column.name)));
        }
        let mismatch = |expected: &str| AppError::Validation(format!("{} must be {}", column.name, expected));
        Ok(match column.kind {
            ColumnKind::Integer => SqlValue::Integer(v.as_i64().ok_or_else(|| mismatch("an integer"))?),
            ColumnKind::Real => SqlValue::Real(v.as_f64().ok_or_else(|| mismatch("a number"))?),
            ColumnKind::Text | ColumnKind::Timestamp => {
                SqlValue::Text(v.as_str().ok_or_else(|| mismatch("a string"))?.to_string())
            }
            ColumnKind::Json => SqlValue::Text(v.to_string()),
        })
    }
}

/// Bind `params` in order.
pub fn bind_all<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &[SqlValue],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for p in params {
        query = match p {
            SqlValue::Null => query.bind(None::<i64>),
            SqlValue::Integer(n) => query.bind(*n),
            SqlValue::Real(f) => query.bind(*f),
            SqlValue::Text(s) => query.bind(s.clone()),
        };
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn json_columns_are_stored_as_text() {
        let col = ColumnDef::attribute("payload", ColumnKind::Json, true);
        assert_eq!(
            SqlValue::for_column(&col, &json!({"rarity": "rare"})).unwrap(),
            SqlValue::Text(r#"{"rarity":"rare"}"#.into())
        );
        assert_eq!(SqlValue::for_column(&col, &Value::Null).unwrap(), SqlValue::Null);
    }

    #[test]
    fn kind_mismatch_is_a_validation_error() {
        let col = ColumnDef::attribute("size", ColumnKind::Integer, false);
        assert_matches!(SqlValue::for_column(&col, &json!("200")), Err(AppError::Validation(_)));
        assert_matches!(SqlValue::for_column(&col, &Value::Null), Err(AppError::Validation(_)));
    }
}
