//! Referential, uniqueness and agreement checks run inside the caller's transaction.

use crate::config::{EntitySchema, ResolvedModel, ID_COLUMN};
use crate::error::{AppError, ConfigError};
use crate::model::DbId;
use crate::sql::{bind_all, cell_to_value, conflicting, exists_where, select_column_by_id, SqlValue};
use serde_json::{Map, Value};
use sqlx::SqliteConnection;

pub(crate) async fn exists(
    conn: &mut SqliteConnection,
    table: &str,
    column: &str,
    value: SqlValue,
) -> Result<bool, AppError> {
    let sql = exists_where(table, column);
    tracing::debug!(sql = %sql, param = ?value, "query");
    let row = bind_all(sqlx::query(&sql), std::slice::from_ref(&value))
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.is_some())
}

fn schema_of<'m>(model: &'m ResolvedModel, resource: &str) -> Result<&'m EntitySchema, AppError> {
    model
        .entity_by_path(resource)
        .ok_or_else(|| ConfigError::UnregisteredResource(resource.to_string()).into())
}

/// Every reference present in `body` must point at an existing row.
pub(crate) async fn check_references(
    conn: &mut SqliteConnection,
    model: &ResolvedModel,
    entity: &EntitySchema,
    body: &Map<String, Value>,
) -> Result<(), AppError> {
    for fk in &entity.references {
        let Some(id) = body.get(fk.column).and_then(Value::as_i64) else {
            continue;
        };
        let target = schema_of(model, fk.target)?;
        if !exists(conn, target.table, ID_COLUMN, SqlValue::Integer(id)).await? {
            return Err(AppError::Validation(format!(
                "{} references missing {} {}",
                fk.column, fk.target, id
            )));
        }
    }
    Ok(())
}

/// Unique columns present in `body` must not collide with another row.
pub(crate) async fn check_unique(
    conn: &mut SqliteConnection,
    entity: &EntitySchema,
    body: &Map<String, Value>,
    except: Option<DbId>,
) -> Result<(), AppError> {
    for &column in &entity.unique {
        let (Some(v), Some(col)) = (body.get(column), entity.column(column)) else {
            continue;
        };
        if v.is_null() {
            continue;
        }
        let sql = conflicting(entity, column);
        let params = [SqlValue::for_column(col, v)?, SqlValue::Integer(except.unwrap_or(0))];
        tracing::debug!(sql = %sql, params = ?params, "query");
        let clash = bind_all(sqlx::query(&sql), &params).fetch_optional(&mut *conn).await?;
        if clash.is_some() {
            tracing::warn!(resource = entity.resource, column, "write refused: duplicate value");
            return Err(AppError::Conflict(format!(
                "{} with {} {} already exists",
                entity.resource, column, v
            )));
        }
    }
    Ok(())
}

/// Denormalized columns of `row` must match the row they are copied from.
/// With `changed`, only agreements touching a changed column are checked.
pub(crate) async fn check_agreements(
    conn: &mut SqliteConnection,
    model: &ResolvedModel,
    entity: &EntitySchema,
    row: &Map<String, Value>,
    changed: Option<&Map<String, Value>>,
) -> Result<(), AppError> {
    for a in &entity.agreements {
        if let Some(changed) = changed {
            if !changed.contains_key(a.column) && !changed.contains_key(a.via) {
                continue;
            }
        }
        let (Some(via_id), Some(expected)) = (row.get(a.via).and_then(Value::as_i64), row.get(a.column)) else {
            continue;
        };
        let fk = entity.reference(a.via).ok_or_else(|| ConfigError::MissingReference {
            kind: "reference",
            id: format!("{}.{}", entity.resource, a.via),
        })?;
        let target = schema_of(model, fk.target)?;
        let Some(target_col) = target.column(a.target_column) else {
            continue;
        };
        let sql = select_column_by_id(target.table, a.target_column);
        tracing::debug!(sql = %sql, param = via_id, "query");
        let Some(found) = sqlx::query(&sql).bind(via_id).fetch_optional(&mut *conn).await? else {
            // reported by check_references
            continue;
        };
        let actual = cell_to_value(&found, 0, target_col.kind)?;
        if actual != *expected {
            return Err(AppError::Validation(format!(
                "{} {} does not match {}.{} {}",
                a.column, expected, fk.target, a.target_column, actual
            )));
        }
    }
    Ok(())
}

/// No other row may still reference `entity` row `id`.
pub(crate) async fn check_dependents(
    conn: &mut SqliteConnection,
    model: &ResolvedModel,
    entity: &EntitySchema,
    id: DbId,
) -> Result<(), AppError> {
    for dep in model.dependents_of(entity.resource) {
        if exists(conn, dep.table, dep.column, SqlValue::Integer(id)).await? {
            tracing::warn!(
                resource = entity.resource,
                id,
                dependent = dep.resource,
                "delete refused: row still referenced"
            );
            return Err(AppError::Conflict(format!(
                "{} {} is still referenced by {}",
                entity.resource, id, dep.resource
            )));
        }
    }
    Ok(())
}
