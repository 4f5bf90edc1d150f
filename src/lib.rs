//! tcgindex: trading card game metadata across vendor catalogs, served by a
//! generic REST resource engine.

pub mod config;
pub mod error;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod registry;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::{resolve, resolve_registry, EntitySchema, ResolvedModel, ServerConfig};
pub use error::{AppError, ConfigError};
pub use migration::apply_migrations;
pub use routes::{build_app, common_routes, entity_routes, resource_routes};
pub use service::{ResourceEngine, SetMembership};
pub use state::AppState;
pub use store::{create_pool, health_check};
