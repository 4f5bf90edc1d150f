//! Entity CRUD routes: one static path pair per registered resource.
//! `PUT` is accepted as an alias of `PATCH`.

use crate::handlers::entity::{create, delete as delete_handler, list, read, update};
use crate::model::Resource;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn resource_routes<R: Resource>() -> Router<AppState> {
    Router::new()
        .route(&format!("/{}", R::RESOURCE), get(list::<R>).post(create::<R>))
        .route(
            &format!("/{}/:id", R::RESOURCE),
            get(read::<R>)
                .patch(update::<R>)
                .put(update::<R>)
                .delete(delete_handler::<R>),
        )
}

/// Routes for everything in the registration table.
pub fn entity_routes(state: AppState) -> Router {
    crate::registry::routes().with_state(state)
}
