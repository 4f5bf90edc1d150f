//! Resource engine: generic CRUD with integrity checks, using the safe SQL builder.

mod crud;
mod integrity;
mod membership;
mod validation;
pub use crud::ResourceEngine;
pub use membership::SetMembership;
pub use validation::RequestValidator;
