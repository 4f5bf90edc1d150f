//! Liveness, readiness and build information.

use crate::state::AppState;
use crate::store::health_check;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};

async fn live() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// 503 while the store cannot answer a trivial query.
async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match health_check(state.engine.pool()).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok", "database": "ok" }))),
        Err(err) => {
            tracing::warn!(error = %err, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable", "database": "unavailable" })),
            )
        }
    }
}

/// Package name, version and the served resources in registration order.
async fn about(State(state): State<AppState>) -> Json<Value> {
    let resources: Vec<&str> = state.engine.model().entities.iter().map(|e| e.resource).collect();
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "resources": resources,
    }))
}

pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(live))
        .route("/ready", get(ready))
        .route("/version", get(about))
        .with_state(state)
}
