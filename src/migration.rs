//! Apply the registry to the database: one table per entity, with its
//! primary key, foreign keys and unique constraints.

use crate::config::{EntitySchema, ResolvedModel, ID_COLUMN, CREATED_AT_COLUMN};
use crate::error::{AppError, ConfigError};
use crate::sql::{quoted, NOW_EXPR};
use crate::store::begin_write;
use sqlx::SqlitePool;

/// CREATE TABLE for one entity. Referenced tables are resolved through `model`.
pub fn create_table_sql(entity: &EntitySchema, model: &ResolvedModel) -> Result<String, ConfigError> {
    let mut defs = Vec::with_capacity(entity.columns.len() + entity.references.len());
    for c in &entity.columns {
        let mut def = format!("{} {}", quoted(c.name), c.kind.sql_type());
        if c.name == ID_COLUMN {
            def.push_str(" PRIMARY KEY");
        } else if !c.nullable {
            def.push_str(" NOT NULL");
        }
        if c.name == CREATED_AT_COLUMN {
            def.push_str(&format!(" DEFAULT ({})", NOW_EXPR));
        }
        defs.push(def);
    }
    for fk in &entity.references {
        let target = model
            .entity_by_path(fk.target)
            .ok_or_else(|| ConfigError::UnregisteredResource(fk.target.to_string()))?;
        defs.push(format!(
            "FOREIGN KEY ({}) REFERENCES {} ({}) ON DELETE RESTRICT",
            quoted(fk.column),
            quoted(target.table),
            quoted(ID_COLUMN)
        ));
    }
    for u in &entity.unique {
        defs.push(format!("UNIQUE ({})", quoted(u)));
    }
    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
        quoted(entity.table),
        defs.join(",\n    ")
    ))
}

/// Create every registered table in registration order. Idempotent.
pub async fn apply_migrations(pool: &SqlitePool, model: &ResolvedModel) -> Result<(), AppError> {
    let mut tx = begin_write(pool).await?;
    for entity in &model.entities {
        let ddl = create_table_sql(entity, model)?;
        tracing::debug!(sql = %ddl, "migration");
        sqlx::query(&ddl).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    tracing::info!(tables = model.entities.len(), "migrations applied");
    Ok(())
}
