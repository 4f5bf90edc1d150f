//! Card sets: the abstract set, its per-catalog renderings and their localized names.

use crate::config::ValidationRule;
use crate::model::{Catalog, DbId, Game, Json, Resource};

entity! {
    /// A game's abstract card set, independent of any catalog.
    ProtoSet {
        resource: "proto_set",
        table: "proto_sets",
        create: ProtoSetCreate,
        update: ProtoSetUpdate,
    }
    fields {
        game_id: DbId,
        name: String,
    }
    schema(s) {
        s.references("game_id", Game::RESOURCE)
            .rule("name", ValidationRule::name())
    }
}

entity! {
    /// One catalog's rendering of a [`ProtoSet`].
    SetRepresentation {
        resource: "set_representation",
        table: "set_representations",
        create: SetRepresentationCreate,
        update: SetRepresentationUpdate,
    }
    fields {
        proto_set_id: DbId,
        catalog_id: DbId,
        name: String,
        /// The catalog's own code for the set, e.g. `COR`.
        identifier: String,
        /// Number of cards the catalog lists for the set.
        size: i64,
        payload: Option<Json>,
    }
    schema(s) {
        s.references("proto_set_id", ProtoSet::RESOURCE)
            .references("catalog_id", Catalog::RESOURCE)
            .rule("name", ValidationRule::name())
            .rule("identifier", ValidationRule::name())
            .rule("size", ValidationRule::non_negative())
    }
}

entity! {
    /// A locale-specific display name of a [`SetRepresentation`].
    LocalizedSetName {
        resource: "localized_set_name",
        table: "localized_set_names",
        create: LocalizedSetNameCreate,
        update: LocalizedSetNameUpdate,
    }
    fields {
        set_representation_id: DbId,
        name: String,
        locale: String,
    }
    schema(s) {
        s.references("set_representation_id", SetRepresentation::RESOURCE)
            .rule("name", ValidationRule::name())
            .rule("locale", ValidationRule::locale())
    }
}
