//! Entity CRUD handlers, generic over the served resource.

use crate::error::AppError;
use crate::model::{DbId, Resource};
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

fn parse_id(id_str: &str) -> Result<DbId, AppError> {
    id_str
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid id '{}'", id_str)))
}

/// Body into a projection. Malformed JSON is a bad request; wrong types,
/// missing or unknown fields are validation errors.
fn projection<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    let body: Value =
        serde_json::from_slice(body).map_err(|e| AppError::BadRequest(format!("malformed JSON body: {}", e)))?;
    if !body.is_object() {
        return Err(AppError::BadRequest("body must be a JSON object".into()));
    }
    serde_json::from_value(body).map_err(|e| AppError::Validation(e.to_string()))
}

pub async fn list<R: Resource>(State(state): State<AppState>) -> Result<Json<Vec<R>>, AppError> {
    Ok(Json(state.engine.list::<R>().await?))
}

pub async fn create<R: Resource>(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<R>), AppError> {
    let payload: R::Create = projection(&body)?;
    let row = state.engine.create::<R>(&payload).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn read<R: Resource>(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<Json<R>, AppError> {
    let id = parse_id(&id_str)?;
    Ok(Json(state.engine.get::<R>(id).await?))
}

pub async fn update<R: Resource>(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    body: Bytes,
) -> Result<Json<R>, AppError> {
    let id = parse_id(&id_str)?;
    let patch: R::Update = projection(&body)?;
    Ok(Json(state.engine.update::<R>(id, &patch).await?))
}

pub async fn delete<R: Resource>(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<Json<R>, AppError> {
    let id = parse_id(&id_str)?;
    Ok(Json(state.engine.delete::<R>(id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CatalogCreate, CatalogUpdate};
    use assert_matches::assert_matches;

    #[test]
    fn ids_must_be_integers() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert_matches!(parse_id("abc"), Err(AppError::BadRequest(_)));
        assert_matches!(parse_id("1.5"), Err(AppError::BadRequest(_)));
    }

    #[test]
    fn malformed_json_is_a_bad_request() {
        let result: Result<CatalogCreate, _> = projection(b"{\"name\":");
        assert_matches!(result, Err(AppError::BadRequest(_)));
    }

    #[test]
    fn non_object_body_is_a_bad_request() {
        let result: Result<CatalogUpdate, _> = projection(b"[1, 2]");
        assert_matches!(result, Err(AppError::BadRequest(_)));
    }

    #[test]
    fn shape_mismatch_is_a_validation_error() {
        let result: Result<CatalogCreate, _> = projection(b"{\"name\": 5}");
        assert_matches!(result, Err(AppError::Validation(_)));
        let result: Result<CatalogCreate, _> = projection(b"{}");
        assert_matches!(result, Err(AppError::Validation(_)));
    }
}
