//! Build a resolved model from a registration table.

use crate::config::resolved::{Dependent, ResolvedModel};
use crate::config::{validate, EntitySchema};
use crate::error::ConfigError;
use std::collections::HashMap;

/// Validate and index `schemas`. Order is kept for migrations.
pub fn resolve(schemas: Vec<EntitySchema>) -> Result<ResolvedModel, ConfigError> {
    validate(&schemas)?;

    let entity_by_path = schemas
        .iter()
        .enumerate()
        .map(|(i, s)| (s.resource, i))
        .collect();

    let dependents = schemas.iter().fold(HashMap::new(), |mut m: HashMap<_, Vec<_>>, s| {
        for fk in &s.references {
            m.entry(fk.target).or_default().push(Dependent {
                resource: s.resource,
                table: s.table,
                column: fk.column,
            });
        }
        m
    });

    Ok(ResolvedModel {
        entities: schemas,
        entity_by_path,
        dependents,
    })
}

/// Resolve the built-in card-game registry.
pub fn resolve_registry() -> Result<ResolvedModel, ConfigError> {
    resolve(crate::registry::schemas())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependents_index_follows_references() {
        let model = resolve_registry().unwrap();
        let of_proto_set: Vec<_> = model.dependents_of("proto_set").iter().map(|d| d.resource).collect();
        assert_eq!(of_proto_set, vec!["set_representation"]);

        let mut of_game: Vec<_> = model.dependents_of("game").iter().map(|d| d.resource).collect();
        of_game.sort();
        assert_eq!(of_game, vec!["card_representation", "proto_card", "proto_set"]);

        assert!(model.dependents_of("localized_card_name").is_empty());
    }

    #[test]
    fn proto_card_has_no_path_to_proto_set() {
        let model = resolve_registry().unwrap();
        let card = model.entity_by_path("proto_card").unwrap();
        assert!(card.references.iter().all(|fk| fk.target != "proto_set"));
        assert!(card.column("proto_set_id").is_none());
    }
}
