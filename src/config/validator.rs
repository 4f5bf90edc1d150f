//! Registry validation: referential integrity of the schemas themselves.

use crate::config::{ColumnKind, EntitySchema};
use crate::error::ConfigError;
use std::collections::{HashMap, HashSet};

pub fn validate(schemas: &[EntitySchema]) -> Result<(), ConfigError> {
    let mut path_segments = HashSet::new();
    let mut tables = HashSet::new();
    for s in schemas {
        if !path_segments.insert(s.resource) {
            return Err(ConfigError::DuplicatePathSegment(s.resource.to_string()));
        }
        if !tables.insert(s.table) {
            return Err(ConfigError::DuplicateTable(s.table.to_string()));
        }
    }
    let by_resource: HashMap<&str, &EntitySchema> = schemas.iter().map(|s| (s.resource, s)).collect();

    for s in schemas {
        for fk in &s.references {
            let col = s.column(fk.column).ok_or_else(|| ConfigError::MissingReference {
                kind: "column",
                id: format!("{}.{}", s.resource, fk.column),
            })?;
            if col.kind != ColumnKind::Integer {
                return Err(ConfigError::Validation(format!(
                    "{}.{} references {} but is not an integer column",
                    s.resource, fk.column, fk.target
                )));
            }
            if !by_resource.contains_key(fk.target) {
                return Err(ConfigError::MissingReference {
                    kind: "resource",
                    id: fk.target.to_string(),
                });
            }
        }

        for &target in &s.forbidden {
            let by_column = format!("{}_id", target);
            let violates = s.references.iter().any(|fk| fk.target == target)
                || s.columns.iter().any(|c| c.name == by_column);
            if violates {
                return Err(ConfigError::ForbiddenReference {
                    resource: s.resource,
                    target,
                });
            }
        }

        for col in s.unique.iter().chain(s.validation.keys()) {
            if s.column(col).is_none() {
                return Err(ConfigError::MissingReference {
                    kind: "column",
                    id: format!("{}.{}", s.resource, col),
                });
            }
        }

        for a in &s.agreements {
            if s.column(a.column).is_none() {
                return Err(ConfigError::MissingReference {
                    kind: "column",
                    id: format!("{}.{}", s.resource, a.column),
                });
            }
            let fk = s.reference(a.via).ok_or_else(|| ConfigError::MissingReference {
                kind: "reference",
                id: format!("{}.{}", s.resource, a.via),
            })?;
            let target = by_resource[fk.target];
            if target.column(a.target_column).is_none() {
                return Err(ConfigError::MissingReference {
                    kind: "column",
                    id: format!("{}.{}", target.resource, a.target_column),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnDef;
    use assert_matches::assert_matches;

    fn game() -> EntitySchema {
        EntitySchema::new(
            "game",
            "games",
            vec![ColumnDef::attribute("name", ColumnKind::Text, false)],
        )
    }

    fn proto_set() -> EntitySchema {
        EntitySchema::new(
            "proto_set",
            "proto_sets",
            vec![
                ColumnDef::attribute("game_id", ColumnKind::Integer, false),
                ColumnDef::attribute("name", ColumnKind::Text, false),
            ],
        )
        .references("game_id", "game")
    }

    #[test]
    fn registry_schemas_are_valid() {
        assert!(validate(&crate::registry::schemas()).is_ok());
    }

    #[test]
    fn duplicate_resource_is_rejected() {
        assert_matches!(
            validate(&[game(), game()]),
            Err(ConfigError::DuplicatePathSegment(p)) if p == "game"
        );
    }

    #[test]
    fn reference_to_unregistered_resource_is_rejected() {
        assert_matches!(
            validate(&[proto_set()]),
            Err(ConfigError::MissingReference { kind: "resource", .. })
        );
    }

    #[test]
    fn forbidden_reference_target_is_rejected() {
        let card = EntitySchema::new(
            "proto_card",
            "proto_cards",
            vec![ColumnDef::attribute("proto_set_id", ColumnKind::Integer, false)],
        )
        .references("proto_set_id", "proto_set")
        .forbids("proto_set");
        assert_matches!(
            validate(&[game(), proto_set(), card]),
            Err(ConfigError::ForbiddenReference { resource: "proto_card", target: "proto_set" })
        );
    }

    #[test]
    fn forbidden_column_name_is_rejected_without_a_declared_reference() {
        let card = EntitySchema::new(
            "proto_card",
            "proto_cards",
            vec![ColumnDef::attribute("proto_set_id", ColumnKind::Integer, true)],
        )
        .forbids("proto_set");
        assert_matches!(
            validate(&[game(), proto_set(), card]),
            Err(ConfigError::ForbiddenReference { .. })
        );
    }

    #[test]
    fn agreement_via_must_be_a_reference() {
        let s = proto_set().agrees("name", "game_name_id", "name");
        assert_matches!(
            validate(&[game(), s]),
            Err(ConfigError::MissingReference { kind: "reference", .. })
        );
    }
}
