//! Shared application state for all routes.

use crate::service::ResourceEngine;

#[derive(Clone)]
pub struct AppState {
    pub engine: ResourceEngine,
}
