//! Resolved entity model: registry validated and indexed for runtime use.

use crate::config::EntitySchema;
use std::collections::HashMap;

/// A row of `resource` (table `table`) that points at another entity through `column`.
#[derive(Clone, Debug, PartialEq)]
pub struct Dependent {
    pub resource: &'static str,
    pub table: &'static str,
    pub column: &'static str,
}

#[derive(Clone, Debug)]
pub struct ResolvedModel {
    /// Registration order (leaf-first).
    pub entities: Vec<EntitySchema>,
    pub entity_by_path: HashMap<&'static str, usize>,
    /// Reverse references: target resource -> rows that reference it.
    pub dependents: HashMap<&'static str, Vec<Dependent>>,
}

impl ResolvedModel {
    pub fn entity_by_path(&self, path: &str) -> Option<&EntitySchema> {
        self.entity_by_path.get(path).map(|&i| &self.entities[i])
    }

    pub fn dependents_of(&self, resource: &str) -> &[Dependent] {
        self.dependents.get(resource).map(Vec::as_slice).unwrap_or(&[])
    }
}
