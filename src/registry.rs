//! The registration table: every served entity, leaf-first.
//!
//! One list drives the schema registry (validation, migrations, dependents)
//! and the HTTP routes, so the two cannot drift apart.

use crate::config::EntitySchema;
use crate::model::*;
use crate::routes::resource_routes;
use crate::state::AppState;
use axum::Router;

macro_rules! registration_table {
    ($($entity:ty),+ $(,)?) => {
        /// Schemas of all registered entities in registration order.
        pub fn schemas() -> Vec<EntitySchema> {
            vec![$(<$entity as Resource>::schema()),+]
        }

        /// CRUD routes of all registered entities.
        pub fn routes() -> Router<AppState> {
            Router::new()$(.merge(resource_routes::<$entity>()))+
        }
    };
}

registration_table! {
    Catalog,
    Game,
    ProtoSet,
    SetRepresentation,
    LocalizedSetName,
    ProtoCard,
    CardRepresentation,
    LocalizedCardName,
}
