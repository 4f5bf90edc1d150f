//! Cards: the abstract card, its per-catalog renderings and their localized names.

use crate::config::ValidationRule;
use crate::model::{DbId, Game, Json, ProtoSet, Resource, SetRepresentation};

entity! {
    /// A game's abstract card, independent of any catalog.
    ///
    /// Carries no set. Which sets a card belongs to is only known through its
    /// representations, so membership is always backed by some catalog.
    ProtoCard {
        resource: "proto_card",
        table: "proto_cards",
        create: ProtoCardCreate,
        update: ProtoCardUpdate,
    }
    fields {
        game_id: DbId,
        name: String,
    }
    schema(s) {
        s.references("game_id", Game::RESOURCE)
            .forbids(ProtoSet::RESOURCE)
            .rule("name", ValidationRule::name())
    }
}

entity! {
    /// One catalog's rendering of a [`ProtoCard`], placed into one [`SetRepresentation`].
    CardRepresentation {
        resource: "card_representation",
        table: "card_representations",
        create: CardRepresentationCreate,
        update: CardRepresentationUpdate,
    }
    fields {
        /// Denormalized; always equal to the proto card's game.
        game_id: DbId,
        proto_card_id: DbId,
        set_representation_id: DbId,
        name: String,
        /// The catalog's own code for the card, e.g. `COR-017`.
        identifier: String,
        payload: Option<Json>,
    }
    schema(s) {
        s.references("game_id", Game::RESOURCE)
            .references("proto_card_id", ProtoCard::RESOURCE)
            .references("set_representation_id", SetRepresentation::RESOURCE)
            .agrees("game_id", "proto_card_id", "game_id")
            .rule("name", ValidationRule::name())
            .rule("identifier", ValidationRule::name())
    }
}

entity! {
    /// A locale-specific display name of a [`CardRepresentation`].
    LocalizedCardName {
        resource: "localized_card_name",
        table: "localized_card_names",
        create: LocalizedCardNameCreate,
        update: LocalizedCardNameUpdate,
    }
    fields {
        card_representation_id: DbId,
        name: String,
        locale: String,
    }
    schema(s) {
        s.references("card_representation_id", CardRepresentation::RESOURCE)
            .rule("name", ValidationRule::name())
            .rule("locale", ValidationRule::locale())
    }
}
