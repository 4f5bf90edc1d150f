//! tcgindex HTTP server.
//!
//! Run from repo root: `cargo run -p tcgindex-server`
//! Configuration is read from the environment (and `.env` when present).

use std::sync::Arc;
use tcgindex::{
    apply_migrations, build_app, create_pool, resolve_registry, AppState, ResourceEngine, ServerConfig,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tcgindex=info,tower_http=info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let model = resolve_registry()?;
    let pool = create_pool(&config.database_url, config.max_connections).await?;
    apply_migrations(&pool, &model).await?;
    tracing::info!(entities = model.entities.len(), "schema ready");

    let state = AppState {
        engine: ResourceEngine::new(pool, Arc::new(model)),
    };
    let app = build_app(state, config.body_limit_bytes);

    let listener = TcpListener::bind(config.bind_addr()).await?;
    let addr = listener.local_addr()?;
    tracing::info!("tcgindex listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
