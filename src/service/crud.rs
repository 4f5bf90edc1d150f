//! Generic CRUD execution: one engine serves every registered entity.

use crate::config::{EntitySchema, ResolvedModel};
use crate::error::{AppError, ConfigError};
use crate::model::{DbId, Resource};
use crate::service::integrity;
use crate::service::RequestValidator;
use crate::sql::{bind_all, delete, insert, row_to_json, select_by_id, select_list, update, QueryBuf, SqlValue};
use crate::store::begin_write;
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::{SqliteConnection, SqlitePool};
use std::sync::Arc;

/// Store handle plus the resolved model. Cheap to clone.
#[derive(Clone)]
pub struct ResourceEngine {
    pool: SqlitePool,
    model: Arc<ResolvedModel>,
}

impl ResourceEngine {
    pub fn new(pool: SqlitePool, model: Arc<ResolvedModel>) -> Self {
        ResourceEngine { pool, model }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn model(&self) -> &ResolvedModel {
        &self.model
    }

    pub(crate) fn entity<R: Resource>(&self) -> Result<&EntitySchema, AppError> {
        self.model
            .entity_by_path(R::RESOURCE)
            .ok_or_else(|| ConfigError::UnregisteredResource(R::RESOURCE.to_string()).into())
    }

    /// Insert one row. References must resolve, unique columns must be free.
    pub async fn create<R: Resource>(&self, payload: &R::Create) -> Result<R, AppError> {
        let entity = self.entity::<R>()?;
        let body = to_object(payload)?;
        RequestValidator::validate(&body, &entity.validation)?;
        let mut values = Vec::new();
        for col in entity.attributes() {
            let v = body.get(col.name).unwrap_or(&Value::Null);
            values.push((col.name, SqlValue::for_column(col, v)?));
        }

        let mut tx = begin_write(&self.pool).await?;
        integrity::check_references(&mut tx, &self.model, entity, &body).await?;
        integrity::check_agreements(&mut tx, &self.model, entity, &body, None).await?;
        integrity::check_unique(&mut tx, entity, &body, None).await?;
        let row = fetch_optional_row(&mut tx, entity, &insert(entity, values))
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))?;
        tx.commit().await?;

        let created: R = decode(row)?;
        tracing::debug!(resource = R::RESOURCE, id = created.id(), "created");
        Ok(created)
    }

    /// Every row, ordered by id.
    pub async fn list<R: Resource>(&self) -> Result<Vec<R>, AppError> {
        let entity = self.entity::<R>()?;
        let q = select_list(entity);
        let mut tx = self.pool.begin().await?;
        tracing::debug!(sql = %q.sql, "query");
        let rows = sqlx::query(&q.sql).fetch_all(&mut *tx).await?;
        tx.commit().await?;
        rows.iter()
            .map(|r| row_to_json(r, entity).and_then(decode::<R>))
            .collect()
    }

    pub async fn get<R: Resource>(&self, id: DbId) -> Result<R, AppError> {
        let entity = self.entity::<R>()?;
        let mut tx = self.pool.begin().await?;
        let row = load(&mut tx, entity, id).await?;
        tx.commit().await?;
        decode(row)
    }

    /// Apply the fields present in `patch`; everything else keeps its value.
    /// A missing row is reported before any problem with the patch.
    pub async fn update<R: Resource>(&self, id: DbId, patch: &R::Update) -> Result<R, AppError> {
        let entity = self.entity::<R>()?;
        let changes = to_object(patch)?;

        let mut tx = begin_write(&self.pool).await?;
        let mut merged = load(&mut tx, entity, id).await?;
        RequestValidator::validate_partial(&changes, &entity.validation)?;
        let mut sets = Vec::with_capacity(changes.len());
        for (name, v) in &changes {
            let col = entity
                .column(name)
                .filter(|c| !c.managed)
                .ok_or_else(|| AppError::Validation(format!("{} cannot be updated", name)))?;
            sets.push((col.name, SqlValue::for_column(col, v)?));
        }
        integrity::check_references(&mut tx, &self.model, entity, &changes).await?;
        merged.extend(changes.clone());
        integrity::check_agreements(&mut tx, &self.model, entity, &merged, Some(&changes)).await?;
        integrity::check_unique(&mut tx, entity, &changes, Some(id)).await?;
        let row = fetch_optional_row(&mut tx, entity, &update(entity, id, sets))
            .await?
            .ok_or(AppError::NotFound {
                resource: entity.resource,
                id,
            })?;
        tx.commit().await?;

        tracing::debug!(resource = R::RESOURCE, id, fields = changes.len(), "updated");
        decode(row)
    }

    /// Remove one row, unless another row still references it.
    pub async fn delete<R: Resource>(&self, id: DbId) -> Result<R, AppError> {
        let entity = self.entity::<R>()?;
        let mut tx = begin_write(&self.pool).await?;
        load(&mut tx, entity, id).await?;
        integrity::check_dependents(&mut tx, &self.model, entity, id).await?;
        let mut q = delete(entity);
        q.params.push(SqlValue::Integer(id));
        let row = fetch_optional_row(&mut tx, entity, &q)
            .await?
            .ok_or(AppError::NotFound {
                resource: entity.resource,
                id,
            })?;
        tx.commit().await?;

        tracing::debug!(resource = R::RESOURCE, id, "deleted");
        decode(row)
    }
}

async fn load(
    conn: &mut SqliteConnection,
    entity: &EntitySchema,
    id: DbId,
) -> Result<Map<String, Value>, AppError> {
    let mut q = select_by_id(entity);
    q.params.push(SqlValue::Integer(id));
    fetch_optional_row(conn, entity, &q)
        .await?
        .ok_or(AppError::NotFound {
            resource: entity.resource,
            id,
        })
}

async fn fetch_optional_row(
    conn: &mut SqliteConnection,
    entity: &EntitySchema,
    q: &QueryBuf,
) -> Result<Option<Map<String, Value>>, AppError> {
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    let row = bind_all(sqlx::query(&q.sql), &q.params)
        .fetch_optional(&mut *conn)
        .await?;
    row.map(|r| row_to_json(&r, entity)).transpose()
}

fn to_object<T: Serialize>(value: &T) -> Result<Map<String, Value>, AppError> {
    match serde_json::to_value(value).map_err(|e| AppError::Validation(e.to_string()))? {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

fn decode<R: Resource>(row: Map<String, Value>) -> Result<R, AppError> {
    serde_json::from_value(Value::Object(row)).map_err(|e| AppError::Decode(e.to_string()))
}
